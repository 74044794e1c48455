//! Logging utilities.
//!
//! Centralizes logger initialization. Everything else logs through the `log`
//! facade; script output is routed to the `kiln::script` target.

mod init;

pub use init::{init_logging, LoggingConfig, LOG_ENV};

/// Log target used for text printed by scripts.
pub const SCRIPT_TARGET: &str = "kiln::script";
