//! Error types for the notebook CI tools.
//!
//! Library crates use [`NotebookCiError`] via `thiserror`.
//! The binaries wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all notebook-ci operations.
#[derive(Debug, thiserror::Error)]
pub enum NotebookCiError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Notebook JSON or glob pattern could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The external notebook tool could not be started.
    #[error("execution error: {message}")]
    Exec { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NotebookCiError>;

impl NotebookCiError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create an execution error from any displayable message.
    pub fn exec(msg: impl Into<String>) -> Self {
        Self::Exec {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
