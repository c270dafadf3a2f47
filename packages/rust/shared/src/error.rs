//! Error types for doccapture.
//!
//! Library crates use [`CaptureError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Per-entry misses (file not found, unreadable file) are *not* errors: they
//! are recorded in the report and counted. Every variant here is run-level
//! and aborts the capture.

use std::path::PathBuf;

/// Top-level error type for all doccapture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error on a path the run depends on (output, config).
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (duplicate manifest, empty title, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A manifest name was requested that neither the config nor the
    /// built-in set defines.
    #[error("unknown manifest '{0}'")]
    UnknownManifest(String),

    /// JSON or TOML serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CaptureError>;

impl CaptureError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
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
