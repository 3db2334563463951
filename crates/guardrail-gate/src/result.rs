//! Structured outcome of a guardrail check.

use serde::{Deserialize, Serialize};

/// Machine-readable outcome of a guardrail check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCode {
    /// Content accepted (possibly sanitized)
    Passed,
    /// Output accepted after truncation
    Truncated,
    /// Output accepted after PII redaction
    Redacted,
    /// Nothing to validate
    Empty,
    /// A blocked term was found
    BlockedTerm,
    /// Items could not be decoded
    Malformed,
}

impl ValidationCode {
    /// Stable string form for logs and audit events.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Truncated => "truncated",
            Self::Redacted => "redacted",
            Self::Empty => "empty",
            Self::BlockedTerm => "blocked_term",
            Self::Malformed => "malformed",
        }
    }

    /// Whether this code describes a rejection.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Empty | Self::BlockedTerm | Self::Malformed)
    }
}

impl std::fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating input or output content.
///
/// A passing result always carries the content to use downstream; a failing
/// result never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult<T> {
    passed: bool,
    code: ValidationCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<T>,
}

impl<T> ValidationResult<T> {
    /// Create a passing result carrying the content to use downstream.
    #[must_use]
    pub fn pass(code: ValidationCode, message: impl Into<String>, modified: T) -> Self {
        Self {
            passed: true,
            code,
            message: message.into(),
            modified: Some(modified),
        }
    }

    /// Create a failing result.
    #[must_use]
    pub fn fail(code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            passed: false,
            code,
            message: message.into(),
            modified: None,
        }
    }

    /// Whether the content was accepted.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Outcome code.
    #[must_use]
    pub fn code(&self) -> ValidationCode {
        self.code
    }

    /// Human-readable reason.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Content to use downstream, present only on pass.
    #[must_use]
    pub fn modified(&self) -> Option<&T> {
        self.modified.as_ref()
    }

    /// Take the content to use downstream.
    #[must_use]
    pub fn into_modified(self) -> Option<T> {
        self.modified
    }
}
