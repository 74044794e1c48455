//! Script host bridge.
//!
//! Embeds a Lua session (via `mlua`) and exposes the synchronous call contract
//! the frame scheduler drives: `init()` once, `update(dt)` per frame budget,
//! `draw()` once per outer iteration. The game is a table in a named module;
//! its methods are invoked with the table as receiver (`Game:update(dt)`).

mod bindings;
mod handles;
mod host;

pub use handles::ScriptHandles;
pub use host::ScriptHost;

use crate::display::PixelBuffer;
use crate::error::ScriptError;

/// Entry points invoked by the host.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EntryPoint {
    Init,
    Update,
    Draw,
}

impl EntryPoint {
    pub fn name(self) -> &'static str {
        match self {
            EntryPoint::Init => "init",
            EntryPoint::Update => "update",
            EntryPoint::Draw => "draw",
        }
    }

    /// Arguments passed besides the receiver.
    pub fn arity(self) -> usize {
        match self {
            EntryPoint::Update => 1,
            EntryPoint::Init | EntryPoint::Draw => 0,
        }
    }

    pub fn signature(self) -> &'static str {
        match self {
            EntryPoint::Init => "init()",
            EntryPoint::Update => "update(_)",
            EntryPoint::Draw => "draw()",
        }
    }

    pub(crate) fn failure(self, source: mlua::Error) -> ScriptError {
        ScriptError::Runtime {
            call: self.signature(),
            source,
        }
    }
}

/// The game as seen by the frame scheduler.
pub trait GameScript {
    fn init(&mut self) -> Result<(), ScriptError>;

    /// `delta_ms` is the fixed frame budget.
    fn update(&mut self, delta_ms: f64) -> Result<(), ScriptError>;

    fn draw(&mut self, canvas: &mut PixelBuffer) -> Result<(), ScriptError>;
}
