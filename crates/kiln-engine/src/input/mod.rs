//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The windowing layer translates platform events into `InputEvent`s; the
//! `InputTranslator` turns those into loop termination or key-state writes.

mod state;
mod translate;
mod types;

pub use state::{KeyStates, SharedKeyStates};
pub use translate::{EventSource, InputTranslator, Translation};
pub use types::{InputEvent, Key, KeyState};
