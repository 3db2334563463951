//! Structured logging setup.

use serde::{Deserialize, Serialize};
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, human-oriented
    Pretty,
    /// Single line per event
    #[default]
    Compact,
    /// Newline-delimited JSON
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" | "text" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::InvalidFormat(other.to_string())),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, used when `RUST_LOG` is unset
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Include the event target
    pub with_target: bool,
    /// Include source file and line
    pub with_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            with_target: true,
            with_file: false,
        }
    }
}

impl LoggingConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default filter directive
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the output format
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Toggle target output
    #[must_use]
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    /// Toggle file and line output
    #[must_use]
    pub fn with_file(mut self, enabled: bool) -> Self {
        self.with_file = enabled;
        self
    }

    /// Build the filter: `RUST_LOG` if set, otherwise the configured level.
    ///
    /// # Errors
    /// Returns error if the configured level is not a valid directive
    pub fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.level)
                .map_err(|e| LoggingError::InvalidLevel(format!("{}: {e}", self.level))),
        }
    }
}

/// Install the global subscriber.
///
/// # Errors
/// Returns error if the level is invalid or a subscriber is already set
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = config.env_filter()?;

    let layer = match config.format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(config.with_target)
            .with_file(config.with_file)
            .with_line_number(config.with_file)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(config.with_target)
            .with_file(config.with_file)
            .with_line_number(config.with_file)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(config.with_target)
            .with_file(config.with_file)
            .with_line_number(config.with_file)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    debug!(level = %config.level, format = ?config.format, "Logging initialized");
    Ok(())
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Failed to install the subscriber
    #[error("Failed to initialize logging: {0}")]
    Init(String),
    /// Invalid filter directive
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),
    /// Unknown output format
    #[error("Unknown log format: {0}")]
    InvalidFormat(String),
}
