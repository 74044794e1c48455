//! Windowing layer.
//!
//! Owns the `winit` event loop, opens the game window and translates window
//! events into platform-agnostic `InputEvent`s.

mod platform;

pub use platform::Platform;
