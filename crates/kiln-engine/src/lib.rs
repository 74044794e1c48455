//! Kiln engine crate.
//!
//! Hosts a Lua game script in a fixed-timestep loop and presents the pixel
//! buffer it draws into through a scaled window.

pub mod config;
pub mod core;
pub mod device;
pub mod display;
pub mod error;
pub mod input;
pub mod logging;
pub mod script;
pub mod time;
pub mod window;

pub use config::HostConfig;
pub use error::{ErrorCategory, HostError};
