use mlua::{Lua, Table, Value};

use crate::display::PixelBuffer;
use crate::error::ScriptError;
use crate::input::SharedKeyStates;

use super::bindings::{self, CANVAS_GLOBAL};
use super::handles::ScriptHandles;
use super::{EntryPoint, GameScript};

/// One interpreter session plus the handles taken from it.
///
/// Dropping the host releases any remaining handles before the session
/// closes. Calls are synchronous and never overlap.
pub struct ScriptHost {
    handles: ScriptHandles,
    lua: Lua,
}

impl ScriptHost {
    /// Opens a session with the safe standard libraries and host bindings.
    pub fn new(keys: SharedKeyStates) -> Result<Self, ScriptError> {
        let lua = Lua::new();
        bindings::install(&lua, keys).map_err(ScriptError::Session)?;
        Ok(Self {
            handles: ScriptHandles::default(),
            lua,
        })
    }

    /// Runs `source` as the module `module`.
    ///
    /// A chunk that returns a table defines the module as that table; any
    /// other chunk defines it as the global table. The module is recorded in
    /// `package.loaded` for [`resolve_entry_points`](Self::resolve_entry_points).
    pub fn load_and_run(&mut self, module: &str, source: &str) -> Result<(), ScriptError> {
        let load_err = |source: mlua::Error| ScriptError::Load {
            module: module.to_owned(),
            source,
        };

        let returned: Value = self
            .lua
            .load(source)
            .set_name(module)
            .call(())
            .map_err(load_err)?;

        let module_table = match returned {
            Value::Table(table) => table,
            _ => self.lua.globals(),
        };

        self.lua
            .globals()
            .get::<Table>("package")
            .and_then(|package| package.get::<Table>("loaded"))
            .and_then(|loaded| loaded.set(module, module_table))
            .map_err(load_err)?;

        log::info!("loaded module `{module}`");
        Ok(())
    }

    /// Resolves `class` in `module` and keeps its handles for the rest of the run.
    ///
    /// Replaces (and releases) any handles from a previous resolution. On
    /// failure no handles are held.
    pub fn resolve_entry_points(&mut self, module: &str, class: &str) -> Result<&ScriptHandles, ScriptError> {
        self.release_handles();
        self.handles = ScriptHandles::resolve(&self.lua, module, class)?;
        Ok(&self.handles)
    }

    pub fn handles(&self) -> &ScriptHandles {
        &self.handles
    }

    /// Releases held handles; returns how many were released.
    pub fn release_handles(&mut self) -> usize {
        let released = self.handles.release(&self.lua);
        if released > 0 {
            log::debug!("released {released} script handles");
        }
        released
    }

    pub fn call_init(&self) -> Result<(), ScriptError> {
        let (init, game) = self.handles.method(&self.lua, EntryPoint::Init)?;
        init.call::<()>(game)
            .map_err(|source| EntryPoint::Init.failure(source))
    }

    /// `delta_ms` is always the fixed frame budget, never measured time.
    pub fn call_update(&self, delta_ms: f64) -> Result<(), ScriptError> {
        let (update, game) = self.handles.method(&self.lua, EntryPoint::Update)?;
        update
            .call::<()>((game, delta_ms))
            .map_err(|source| EntryPoint::Update.failure(source))
    }

    /// Calls `draw` with `canvas` lent to the script as the `Canvas` global.
    ///
    /// The loan ends when the call returns; a script that keeps the userdata
    /// gets an error on later use instead of a dangling buffer.
    pub fn call_draw(&self, canvas: &mut PixelBuffer) -> Result<(), ScriptError> {
        let (draw, game) = self.handles.method(&self.lua, EntryPoint::Draw)?;
        let globals = self.lua.globals();

        self.lua
            .scope(|scope| {
                globals.set(CANVAS_GLOBAL, scope.create_userdata_ref_mut(canvas)?)?;
                let result = draw.call::<()>(game);
                globals.set(CANVAS_GLOBAL, Value::Nil)?;
                result
            })
            .map_err(|source| EntryPoint::Draw.failure(source))
    }

    /// The underlying session, for embedders that add their own bindings.
    pub fn lua(&self) -> &Lua {
        &self.lua
    }
}

impl GameScript for ScriptHost {
    fn init(&mut self) -> Result<(), ScriptError> {
        self.call_init()
    }

    fn update(&mut self, delta_ms: f64) -> Result<(), ScriptError> {
        self.call_update(delta_ms)
    }

    fn draw(&mut self, canvas: &mut PixelBuffer) -> Result<(), ScriptError> {
        self.call_draw(canvas)
    }
}

impl Drop for ScriptHost {
    fn drop(&mut self) {
        self.release_handles();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Rgba;
    use crate::input::{Key, KeyState};

    const GAME: &str = r#"
        Game = { inits = 0, updates = 0, total = 0, draws = 0 }

        function Game:init()
            self.inits = self.inits + 1
        end

        function Game:update(dt)
            self.updates = self.updates + 1
            self.total = self.total + dt
            self.left = Keyboard.isKeyDown("left")
        end

        function Game:draw()
            self.draws = self.draws + 1
            Canvas:clear(0x000000FF)
            Canvas:pset(1, 1, 0xFF0000FF)
            Canvas:rectfill(2, 0, 2, 2, 0x00FF00FF)
        end
    "#;

    fn host(source: &str) -> ScriptHost {
        let mut host = ScriptHost::new(SharedKeyStates::new()).unwrap();
        host.load_and_run("main", source).unwrap();
        host.resolve_entry_points("main", "Game").unwrap();
        host
    }

    fn game_field(host: &ScriptHost, field: &str) -> Value {
        let game: Table = host.lua().globals().get("Game").unwrap();
        game.get(field).unwrap()
    }

    // ── loading ───────────────────────────────────────────────────────────

    #[test]
    fn syntax_error_is_a_load_error() {
        let mut host = ScriptHost::new(SharedKeyStates::new()).unwrap();
        let err = host.load_and_run("main", "function (").unwrap_err();
        assert!(matches!(err, ScriptError::Load { ref module, .. } if module == "main"));
    }

    #[test]
    fn runtime_error_during_load_is_a_load_error() {
        let mut host = ScriptHost::new(SharedKeyStates::new()).unwrap();
        let err = host.load_and_run("main", "error('nope')").unwrap_err();
        assert!(matches!(err, ScriptError::Load { .. }));
    }

    #[test]
    fn returned_table_becomes_the_module() {
        let mut host = ScriptHost::new(SharedKeyStates::new()).unwrap();
        let source = r#"
            local Game = {}
            function Game:init() end
            function Game:update(dt) end
            function Game:draw() end
            return { Game = Game }
        "#;
        host.load_and_run("main", source).unwrap();
        assert!(host.resolve_entry_points("main", "Game").unwrap().is_resolved());

        let global: Value = host.lua().globals().get("Game").unwrap();
        assert!(global.is_nil());
    }

    #[test]
    fn missing_drawer_fails_resolution_and_holds_nothing() {
        let mut host = ScriptHost::new(SharedKeyStates::new()).unwrap();
        host.load_and_run("main", "Game = {} function Game:init() end function Game:update(dt) end")
            .unwrap();
        let err = host.resolve_entry_points("main", "Game").unwrap_err();
        assert!(matches!(err, ScriptError::EntryPointMissing { .. }));
        assert_eq!(host.handles().held(), 0);
        assert_eq!(host.release_handles(), 0);
    }

    // ── calls ─────────────────────────────────────────────────────────────

    #[test]
    fn init_runs_with_the_class_as_receiver() {
        let host = host(GAME);
        host.call_init().unwrap();
        assert_eq!(game_field(&host, "inits"), Value::Integer(1));
    }

    #[test]
    fn update_receives_the_fixed_delta() {
        let host = host(GAME);
        host.call_update(16.0).unwrap();
        host.call_update(16.0).unwrap();
        assert_eq!(game_field(&host, "updates"), Value::Integer(2));
        assert_eq!(game_field(&host, "total"), Value::Number(32.0));
    }

    #[test]
    fn update_sees_shared_key_state() {
        let keys = SharedKeyStates::new();
        let mut host = ScriptHost::new(keys.clone()).unwrap();
        host.load_and_run("main", GAME).unwrap();
        host.resolve_entry_points("main", "Game").unwrap();

        keys.store(Key::ArrowLeft, KeyState::Pressed);
        host.call_update(16.0).unwrap();
        assert_eq!(game_field(&host, "left"), Value::Boolean(true));

        keys.store(Key::ArrowLeft, KeyState::Released);
        host.call_update(16.0).unwrap();
        assert_eq!(game_field(&host, "left"), Value::Boolean(false));
    }

    #[test]
    fn draw_writes_through_the_canvas() {
        let host = host(GAME);
        let mut canvas = PixelBuffer::new(8, 8);
        host.call_draw(&mut canvas).unwrap();

        assert_eq!(canvas.get_pixel(1, 1), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(canvas.get_pixel(3, 1), Some(Rgba::rgb(0, 255, 0)));
        assert_eq!(canvas.get_pixel(0, 0), Some(Rgba::BLACK));
        assert_eq!(game_field(&host, "draws"), Value::Integer(1));
    }

    #[test]
    fn canvas_is_gone_after_draw() {
        let host = host(GAME);
        let mut canvas = PixelBuffer::new(4, 4);
        host.call_draw(&mut canvas).unwrap();
        let canvas_global: Value = host.lua().globals().get(CANVAS_GLOBAL).unwrap();
        assert!(canvas_global.is_nil());
    }

    #[test]
    fn kept_canvas_cannot_be_used_later() {
        let source = r#"
            Game = {}
            function Game:init() end
            function Game:update(dt) self.stale:pset(0, 0, 0xFFFFFFFF) end
            function Game:draw() self.stale = Canvas end
        "#;
        let host = host(source);
        let mut canvas = PixelBuffer::new(4, 4);
        host.call_draw(&mut canvas).unwrap();
        let err = host.call_update(16.0).unwrap_err();
        assert!(matches!(err, ScriptError::Runtime { call: "update(_)", .. }));
    }

    #[test]
    fn failing_draw_reports_a_runtime_error() {
        let source = r#"
            Game = {}
            function Game:init() end
            function Game:update(dt) end
            function Game:draw() error("bad frame") end
        "#;
        let host = host(source);
        let mut canvas = PixelBuffer::new(4, 4);
        let err = host.call_draw(&mut canvas).unwrap_err();
        assert!(matches!(err, ScriptError::Runtime { call: "draw()", .. }));
        let canvas_global: Value = host.lua().globals().get(CANVAS_GLOBAL).unwrap();
        assert!(canvas_global.is_nil());
    }

    #[test]
    fn calls_before_resolution_fail() {
        let host = ScriptHost::new(SharedKeyStates::new()).unwrap();
        assert!(matches!(host.call_init(), Err(ScriptError::Unresolved)));
    }

    // ── lifetime ──────────────────────────────────────────────────────────

    #[test]
    fn explicit_release_then_drop_releases_once() {
        let mut host = host(GAME);
        assert_eq!(host.release_handles(), 4);
        assert_eq!(host.release_handles(), 0);
        drop(host);
    }

    #[test]
    fn re_resolution_replaces_handles() {
        let mut host = host(GAME);
        host.resolve_entry_points("main", "Game").unwrap();
        assert_eq!(host.release_handles(), 4);
    }
}
