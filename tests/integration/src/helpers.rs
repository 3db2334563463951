//! Test helper utilities for integration tests

use guardrail_config::ComplianceRules;
use guardrail_gate::{GuardrailGate, ValidationResult};
use guardrail_telemetry::{AuditLogConfig, AuditLogger};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Initialize tracing for tests (only once)
static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
});

/// Initialize tracing for tests
pub fn init_tracing() {
    Lazy::force(&TRACING);
}

/// Gate built from the default rules
pub fn default_gate() -> Arc<GuardrailGate> {
    Arc::new(GuardrailGate::with_defaults().expect("default rules are valid"))
}

/// Gate built from custom rules
pub fn gate_with(rules: ComplianceRules) -> Arc<GuardrailGate> {
    Arc::new(GuardrailGate::new(rules).expect("rules are valid"))
}

/// Audit logger that buffers without writing to the log
pub fn quiet_audit() -> AuditLogger {
    AuditLogger::new(AuditLogConfig {
        enabled: true,
        log_to_stdout: false,
        buffer_size: 256,
    })
}

/// Assert a validation passed and return its content
pub fn assert_passed<T: std::fmt::Debug>(result: ValidationResult<T>) -> T {
    assert!(result.passed(), "expected pass, got: {}", result.message());
    result
        .into_modified()
        .expect("passing result carries content")
}

/// Assert a validation failed with the given message
pub fn assert_failed<T: std::fmt::Debug>(result: &ValidationResult<T>, message: &str) {
    assert!(!result.passed(), "expected failure, got pass");
    assert_eq!(result.message(), message);
    assert!(result.modified().is_none());
}
