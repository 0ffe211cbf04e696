//! Error types for linkdex.
//!
//! Library crates use [`LinkdexError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all linkdex operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkdexError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during fetch.
    #[error("network error: {0}")]
    Network(String),

    /// Bookmark export or HTML parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Dedup ledger error. Always run-fatal: a broken ledger invalidates
    /// the dedup contract.
    #[error("ledger error: {0}")]
    Ledger(String),

    /// Index sink rejected a document or was unreachable.
    #[error("index error: {0}")]
    Index(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LinkdexError>;

impl LinkdexError {
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

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = LinkdexError::config("parameter --location is required");
        assert_eq!(
            err.to_string(),
            "config error: parameter --location is required"
        );

        let err = LinkdexError::Ledger("table create failed".into());
        assert!(err.to_string().contains("ledger error"));
    }
}
