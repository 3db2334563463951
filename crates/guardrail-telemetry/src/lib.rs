//! # Guardrail Telemetry
//!
//! Observability for the agent guardrail gate.
//!
//! This crate provides:
//! - Structured logging setup (pretty, compact or JSON output)
//! - An audit trail of guardrail decisions

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
pub mod logging;

// Re-export main types
pub use audit::{
    AuditEventBuilder, AuditLogConfig, AuditLogger, AuditOutcome, AuditStage, GuardrailAuditEvent,
};
pub use logging::{init_logging, LogFormat, LoggingConfig, LoggingError};
