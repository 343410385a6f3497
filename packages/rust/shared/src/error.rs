//! Error types for resolvekit.
//!
//! Library crates use [`ResolveKitError`] via `thiserror`.
//! App crates (cli/server) wrap this with `color-eyre` or map it to HTTP responses.
//!
//! Malformed markup and missing documents are deliberately absent from this
//! enum: the normalizer and classifier never fail, and store reads return
//! `Option` for "not found".

use std::path::PathBuf;

/// Top-level error type for all resolvekit operations.
#[derive(Debug, thiserror::Error)]
pub enum ResolveKitError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Local database error (open, migrate, query).
    #[error("storage error: {0}")]
    Storage(String),

    /// A save did not reach the store. Transient; the caller may retry.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// Transport-level error talking to a remote store.
    #[error("network error: {0}")]
    Network(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Request or data validation error.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// HTML-to-Markdown conversion error.
    #[error("conversion error: {0}")]
    Conversion(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ResolveKitError>;

impl ResolveKitError {
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

    /// Whether the operation may succeed if simply repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Network(_))
    }
}
