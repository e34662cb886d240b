//! Error types for `shlf-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`. None of these errors are
//! fatal: the view store recovers each one locally, either by showing an
//! empty snapshot or by reporting the failed mutation to its caller.

use std::path::PathBuf;

/// Unified error type for all core operations.
///
/// Each variant captures just enough context for the caller to display
/// a meaningful message or take corrective action.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The watched directory is missing, not a directory, or unreadable.
    #[error("directory unavailable: {0}")]
    DirectoryUnavailable(PathBuf),

    /// A rename target was rejected before touching the filesystem.
    #[error("invalid name: {0}")]
    Validation(String),

    /// A trash, move or clipboard operation failed at the OS level.
    #[error("{operation} failed: {reason}")]
    OperationFailed { operation: String, reason: String },

    /// The change watcher could not be established.
    #[error("watch unavailable: {0}")]
    WatchUnavailable(String),

    /// Failed to parse or validate the TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The destination of a move already exists.
    #[error("already exists: {0}")]
    AlreadyExists(PathBuf),

    /// Preview generation failed (unsupported format, decode error, ...).
    #[error("preview error: {0}")]
    Preview(String),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Wraps any lower-level failure as [`CoreError::OperationFailed`].
    pub fn operation(operation: &str, reason: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience alias used throughout `shlf-core`.
pub type CoreResult<T> = Result<T, CoreError>;
