//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for the Launcher
//!
//! Every fallible library operation returns `Result<T, AppError>`. Line-level
//! problems in the settings and state files are not errors: they are reported
//! as [`ParseWarning`] values next to the parsed data and never abort a load.

use std::{fmt, io, path::PathBuf};
use thiserror::Error;

/// Unified error type for all launcher operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Directory listing could not be opened, or the path vanished.
    #[error("Cannot access directory {path:?}: {source}")]
    NotAccessible {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A helper tool could not be located in any search directory.
    #[error("Unable to find the required application '{0}'")]
    NotFound(String),

    /// The child process for a file-type rule (or the shell opener) failed to start.
    #[error("Failed to run '{command}': {source}")]
    LaunchFailed {
        command: String,
        #[source]
        source: io::Error,
    },

    /// Settings file could not be read.
    #[error("Failed to read settings file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// State file could not be read or written.
    #[error("Failed to access state file {path:?}: {source}")]
    StateIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Terminal I/O or rendering error.
    #[error("Terminal error: {0}")]
    Terminal(String),
}

impl AppError {
    pub fn not_accessible<S: Into<String>>(path: S, source: io::Error) -> Self {
        Self::NotAccessible {
            path: path.into(),
            source,
        }
    }

    pub fn launch_failed<S: Into<String>>(command: S, source: io::Error) -> Self {
        Self::LaunchFailed {
            command: command.into(),
            source,
        }
    }

    /// True for failures the host should show to the user as a notification.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::NotAccessible { .. } | Self::NotFound(_) | Self::LaunchFailed { .. }
        )
    }
}

/// A malformed settings or state line. Logged and skipped, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based line number in the source file.
    pub line_no: usize,
    pub line: String,
    pub reason: String,
}

impl ParseWarning {
    pub fn new<L: Into<String>, R: Into<String>>(line_no: usize, line: L, reason: R) -> Self {
        Self {
            line_no,
            line: line.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ('{}')", self.line_no, self.reason, self.line)
    }
}
