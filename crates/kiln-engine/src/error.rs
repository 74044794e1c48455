//! Error taxonomy.
//!
//! Every failure is fatal for the run. The category decides how much has been
//! acquired by the time it happens and what the user sees before exit.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Window, event loop, GPU or texture creation failed.
#[derive(Debug, Error)]
#[error("display initialization failed: {0:#}")]
pub struct DisplayInitError(pub anyhow::Error);

impl From<anyhow::Error> for DisplayInitError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

/// Failures reported by the script host.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("interpreter session could not be prepared: {0}")]
    Session(#[source] mlua::Error),

    #[error("module `{module}` failed to load: {source}")]
    Load {
        module: String,
        #[source]
        source: mlua::Error,
    },

    #[error("entry point `{name}` is missing from module `{module}`")]
    EntryPointMissing { module: String, name: String },

    #[error("entry points have not been resolved")]
    Unresolved,

    #[error("call to `{call}` failed: {source}")]
    Runtime {
        call: &'static str,
        #[source]
        source: mlua::Error,
    },
}

/// A frame could not be shown and the failure policy asked to stop.
#[derive(Debug, Error)]
pub enum PresentError {
    #[error("surface error: {0}")]
    Surface(wgpu::SurfaceError),
}

/// Where in the lifecycle a failure happened.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorCategory {
    /// Before the display and script exist.
    Startup,
    /// After display init, while loading or resolving the script.
    Load,
    /// After the loop has started.
    Runtime,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorCategory::Startup => "startup",
            ErrorCategory::Load => "load",
            ErrorCategory::Runtime => "runtime",
        })
    }
}

/// Top-level error returned by a host run.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("could not read `{}`: {source}", path.display())]
    ReadScript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Display(#[from] DisplayInitError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Present(#[from] PresentError),
}

impl HostError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HostError::ReadScript { .. } | HostError::Display(_) => ErrorCategory::Startup,
            HostError::Script(ScriptError::Runtime { .. }) => ErrorCategory::Runtime,
            HostError::Script(_) => ErrorCategory::Load,
            HostError::Present(_) => ErrorCategory::Runtime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entry_point_is_a_load_error() {
        let err = HostError::from(ScriptError::EntryPointMissing {
            module: "main".into(),
            name: "Game.draw".into(),
        });
        assert_eq!(err.category(), ErrorCategory::Load);
        assert_eq!(err.to_string(), "entry point `Game.draw` is missing from module `main`");
    }

    #[test]
    fn call_failure_is_a_runtime_error() {
        let err = HostError::from(ScriptError::Runtime {
            call: "update(_)",
            source: mlua::Error::RuntimeError("boom".into()),
        });
        assert_eq!(err.category(), ErrorCategory::Runtime);
    }

    #[test]
    fn display_failure_is_a_startup_error() {
        let err = HostError::from(DisplayInitError(anyhow::anyhow!("no adapter")));
        assert_eq!(err.category(), ErrorCategory::Startup);
        assert_eq!(err.category().to_string(), "startup");
    }
}
