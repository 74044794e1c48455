use mlua::{Function, Lua, RegistryKey, Table, Value};

use crate::error::ScriptError;

use super::EntryPoint;

/// Registry references to the game class and its three entry points.
///
/// Either all four are set or none are. Each is released exactly once via
/// [`release`](Self::release), which must run while the session that created
/// them is still open.
#[derive(Debug, Default)]
pub struct ScriptHandles {
    init: Option<RegistryKey>,
    update: Option<RegistryKey>,
    draw: Option<RegistryKey>,
    game: Option<RegistryKey>,
}

impl ScriptHandles {
    /// Looks up `class` in the module registered as `module` and takes
    /// references to it and its entry points.
    pub(crate) fn resolve(lua: &Lua, module: &str, class: &str) -> Result<Self, ScriptError> {
        let missing = |name: String| ScriptError::EntryPointMissing {
            module: module.to_owned(),
            name,
        };

        let module_table = lua
            .globals()
            .get::<Table>("package")
            .and_then(|package| package.get::<Table>("loaded"))
            .and_then(|loaded| loaded.get::<Value>(module))
            .ok()
            .and_then(|value| value.as_table().cloned())
            .ok_or_else(|| missing(module.to_owned()))?;

        let class_table = match module_table.get::<Value>(class) {
            Ok(Value::Table(table)) => table,
            _ => return Err(missing(class.to_owned())),
        };

        let method = |entry: EntryPoint| match class_table.get::<Value>(entry.name()) {
            Ok(Value::Function(f)) => Ok(f),
            _ => Err(missing(format!("{class}.{}", entry.signature()))),
        };

        let init = method(EntryPoint::Init)?;
        let update = method(EntryPoint::Update)?;
        let draw = method(EntryPoint::Draw)?;

        let mut handles = ScriptHandles::default();
        if let Err(source) = handles.fill(lua, init, update, draw, class_table) {
            handles.release(lua);
            return Err(ScriptError::Session(source));
        }

        log::debug!("resolved {module}.{class} entry points");
        Ok(handles)
    }

    fn fill(
        &mut self,
        lua: &Lua,
        init: Function,
        update: Function,
        draw: Function,
        game: Table,
    ) -> mlua::Result<()> {
        self.init = Some(lua.create_registry_value(init)?);
        self.update = Some(lua.create_registry_value(update)?);
        self.draw = Some(lua.create_registry_value(draw)?);
        self.game = Some(lua.create_registry_value(game)?);
        Ok(())
    }

    /// Number of references currently held.
    pub fn held(&self) -> usize {
        [&self.init, &self.update, &self.draw, &self.game]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    pub fn is_resolved(&self) -> bool {
        self.held() == 4
    }

    /// Releases every held reference and returns how many were released.
    ///
    /// Unset slots are skipped, so calling this again, or on a partially
    /// filled set, is harmless.
    pub fn release(&mut self, lua: &Lua) -> usize {
        let mut released = 0;
        for slot in [&mut self.init, &mut self.update, &mut self.draw, &mut self.game] {
            if let Some(key) = slot.take() {
                if let Err(err) = lua.remove_registry_value(key) {
                    log::warn!("failed to release script handle: {err}");
                }
                released += 1;
            }
        }
        released
    }

    /// Fetches the callable for `entry` together with the game instance.
    pub(crate) fn method(&self, lua: &Lua, entry: EntryPoint) -> Result<(Function, Table), ScriptError> {
        let slot = match entry {
            EntryPoint::Init => &self.init,
            EntryPoint::Update => &self.update,
            EntryPoint::Draw => &self.draw,
        };
        let (Some(key), Some(game)) = (slot, &self.game) else {
            return Err(ScriptError::Unresolved);
        };

        let fetch = || -> mlua::Result<(Function, Table)> {
            Ok((lua.registry_value(key)?, lua.registry_value(game)?))
        };
        fetch().map_err(|source| entry.failure(source))
    }
}
