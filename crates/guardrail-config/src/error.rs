//! Configuration error types.

use guardrail_core::GuardError;
use std::path::PathBuf;

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Configuration error type.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Rules file could not be read.
    #[error("Failed to read rules file {path}: {source}")]
    Io {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Rules document could not be parsed.
    #[error("Failed to parse {format} rules: {message}")]
    Parse {
        /// Document format
        format: &'static str,
        /// Parser message
        message: String,
    },

    /// File extension is not a known rules format.
    #[error("Unsupported rules file format: {0}")]
    UnsupportedFormat(String),

    /// Environment override has an invalid value.
    #[error("Invalid value for {var}: {message}")]
    InvalidOverride {
        /// Variable name
        var: &'static str,
        /// Reason
        message: String,
    },

    /// Rules failed validation.
    #[error("Invalid compliance rules: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create a validation error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// Create a parse error.
    pub fn parse(format: &'static str, msg: impl std::fmt::Display) -> Self {
        Self::Parse {
            format,
            message: msg.to_string(),
        }
    }
}

impl From<ConfigError> for GuardError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
