//! Error types for Jutsudex.
//!
//! Library crates use [`JutsudexError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.
//!
//! Per-record parse failures (bad rank token, missing field) are modeled
//! by the engine's own typed failure and never abort an ingestion run;
//! the variants here cover the adapter surfaces around the core.

use std::path::PathBuf;

/// Top-level error type for all Jutsudex operations.
#[derive(Debug, thiserror::Error)]
pub enum JutsudexError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Record parsing error surfaced outside the ingestion loop.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Rendering or export error.
    #[error("render error: {0}")]
    Render(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, JutsudexError>;

impl JutsudexError {
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

    /// Create a render error from any displayable message.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
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
        let err = JutsudexError::config("missing output directory");
        assert_eq!(err.to_string(), "config error: missing output directory");

        let err = JutsudexError::parse("record 42 has no name");
        assert!(err.to_string().contains("record 42"));
    }
}
