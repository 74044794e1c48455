//! Host functions exposed to scripts.
//!
//! - `Keyboard.isKeyDown(name)` reads the shared key-state table.
//! - `print(...)` goes to the log under the `kiln::script` target.
//! - `Canvas` exists only while `draw` runs and writes the frame buffer.

use mlua::{Function, Lua, UserData, UserDataMethods, Value, Variadic};

use crate::display::{PixelBuffer, Rgba};
use crate::input::{Key, SharedKeyStates};
use crate::logging::SCRIPT_TARGET;

pub(crate) const KEYBOARD_GLOBAL: &str = "Keyboard";
pub(crate) const CANVAS_GLOBAL: &str = "Canvas";

pub(crate) fn install(lua: &Lua, keys: SharedKeyStates) -> mlua::Result<()> {
    let globals = lua.globals();

    let keyboard = lua.create_table()?;
    keyboard.set(
        "isKeyDown",
        lua.create_function(move |_, name: String| {
            Ok(Key::from_name(&name).is_some_and(|key| keys.is_down(key)))
        })?,
    )?;
    globals.set(KEYBOARD_GLOBAL, keyboard)?;

    globals.set(
        "print",
        lua.create_function(|lua, args: Variadic<Value>| {
            let tostring: Function = lua.globals().get("tostring")?;
            let parts = args
                .into_iter()
                .map(|v| tostring.call::<String>(v))
                .collect::<mlua::Result<Vec<_>>>()?;
            log::info!(target: SCRIPT_TARGET, "{}", parts.join("\t"));
            Ok(())
        })?,
    )?;

    Ok(())
}

fn color(packed: Option<u32>) -> Rgba {
    packed.map(Rgba::from_u32).unwrap_or(Rgba::BLACK)
}

/// Colors are packed `0xRRGGBBAA` integers. Coordinates are clipped.
impl UserData for PixelBuffer {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("width", |_, this, ()| Ok(this.width()));
        methods.add_method("height", |_, this, ()| Ok(this.height()));

        methods.add_method_mut("clear", |_, this, packed: Option<u32>| {
            this.clear(color(packed));
            Ok(())
        });

        methods.add_method_mut("pset", |_, this, (x, y, packed): (i64, i64, u32)| {
            this.set_pixel(x, y, Rgba::from_u32(packed));
            Ok(())
        });

        methods.add_method("pget", |_, this, (x, y): (i64, i64)| {
            Ok(this.get_pixel(x, y).map(Rgba::to_u32))
        });

        methods.add_method_mut(
            "rectfill",
            |_, this, (x, y, w, h, packed): (i64, i64, i64, i64, u32)| {
                this.fill_rect(x, y, w, h, Rgba::from_u32(packed));
                Ok(())
            },
        );
    }
}
