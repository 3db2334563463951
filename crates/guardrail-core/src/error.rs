//! Error types for the guardrail gate.

/// Result type for guardrail operations.
pub type GuardResult<T> = std::result::Result<T, GuardError>;

/// Guardrail error type.
///
/// Policy violations are never reported through this type; they are
/// ordinary validation results. `GuardError` covers construction-time
/// failures: bad rules, bad user data and undecodable items.
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// Caller identity failed validation.
    #[error("Invalid user context: {0}")]
    InvalidUser(String),

    /// Conversation item could not be decoded.
    #[error("Malformed conversation item: {0}")]
    MalformedItem(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("Internal guardrail error: {0}")]
    Internal(String),
}

impl GuardError {
    /// Create an invalid user error.
    pub fn invalid_user(msg: impl Into<String>) -> Self {
        Self::InvalidUser(msg.into())
    }

    /// Create a malformed item error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedItem(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
