//! # Agent Guardrail Gate
//!
//! Content and access guardrails for conversational agent runtimes.
//!
//! ## Features
//!
//! - Input validation: blocked terms, injection-character stripping, length
//!   capping
//! - Output validation: truncation, blocked terms, PII redaction
//! - Role-based handoff permission and handoff history filtering
//! - Guarded turns and sessions around any [`AgentRuntime`]
//! - Structured logging and an audit trail of guardrail decisions
//!
//! ## Usage
//!
//! ```rust,no_run
//! use agent_guardrail_gate::GuardrailStack;
//!
//! # async fn start() -> Result<(), Box<dyn std::error::Error>> {
//! // Rules from GUARDRAIL_RULES_PATH (or defaults) plus GUARDRAIL_* overrides
//! let stack = GuardrailStack::from_env().await?;
//! let verdict = stack.gate().validate_output("It is sunny.");
//! assert!(verdict.passed());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;
use tracing::info;

pub use guardrail_config::{
    apply_env_overrides, load_rules, load_rules_from_env, ComplianceRules, ConfigError,
    ConfigFormat, EnvOverrides, RULES_PATH_ENV,
};
pub use guardrail_core::{
    ConversationItem, GuardError, GuardResult, ItemRole, SessionId, UserContext, UserRole,
};
pub use guardrail_gate::{
    evaluate_handoff_permission, BlockedTerms, ComplianceHandoffFilter, FilterChain,
    GuardrailGate, HandoffFilter, HandoffGuard, HandoffInputData, HandoffPolicy, PiiRedactor,
    RoleBasedHandoffPolicy, ToolItemFilter, ValidationCode, ValidationResult,
};
pub use guardrail_runtime::{
    AgentRun, AgentRuntime, GuardedRunner, GuardedSession, Rejection, RejectionStage,
    TurnOutcome, BLANK_PROMPT_MESSAGE, INPUT_APOLOGY, OUTPUT_APOLOGY, SYSTEM_APOLOGY,
};
pub use guardrail_telemetry::{
    init_logging, AuditLogConfig, AuditLogger, AuditOutcome, AuditStage, LogFormat,
    LoggingConfig, LoggingError,
};

/// Everything a deployment shares: the gate, its handoff guard and the
/// audit log.
#[derive(Debug, Clone)]
pub struct GuardrailStack {
    gate: Arc<GuardrailGate>,
    handoff: HandoffGuard,
    audit: AuditLogger,
}

impl GuardrailStack {
    /// Load rules the standard way and build the stack.
    ///
    /// # Errors
    /// Returns an error if the rules cannot be loaded or are invalid.
    pub async fn from_env() -> GuardResult<Self> {
        let rules = load_rules_from_env().await?;
        Self::from_rules(rules)
    }

    /// Build the stack from explicit rules.
    ///
    /// # Errors
    /// Returns an error if the rules are invalid.
    pub fn from_rules(rules: ComplianceRules) -> GuardResult<Self> {
        let gate = Arc::new(GuardrailGate::new(rules)?);
        let audit = AuditLogger::with_defaults();
        let handoff = HandoffGuard::for_gate(&gate).with_audit(audit.clone());

        info!(
            version = env!("CARGO_PKG_VERSION"),
            blocked_terms = gate.blocked_terms().len(),
            max_response_length = gate.rules().max_response_length,
            "Guardrail stack ready"
        );

        Ok(Self {
            gate,
            handoff,
            audit,
        })
    }

    /// Replace the audit log used by runners and the handoff guard.
    #[must_use]
    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.handoff = self.handoff.with_audit(audit.clone());
        self.audit = audit;
        self
    }

    /// Replace the handoff guard. Its decisions go to this stack's audit log.
    #[must_use]
    pub fn with_handoff_guard(mut self, handoff: HandoffGuard) -> Self {
        self.handoff = handoff.with_audit(self.audit.clone());
        self
    }

    /// Decide a handoff for `user` and record it in the audit log.
    pub async fn authorize_handoff(
        &self,
        user: &UserContext,
        target_agent: &str,
        session_id: Option<&SessionId>,
    ) -> bool {
        self.handoff
            .authorize_audited(user, target_agent, session_id)
            .await
    }

    /// Shared gate.
    #[must_use]
    pub fn gate(&self) -> &Arc<GuardrailGate> {
        &self.gate
    }

    /// Handoff guard to register with the runtime.
    #[must_use]
    pub fn handoff(&self) -> &HandoffGuard {
        &self.handoff
    }

    /// Audit log.
    #[must_use]
    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Wrap a runtime with this stack's gate and audit log.
    #[must_use]
    pub fn runner(&self, runtime: Arc<dyn AgentRuntime>) -> GuardedRunner {
        GuardedRunner::new(Arc::clone(&self.gate), runtime).with_audit(self.audit.clone())
    }

    /// Start a session for `user` at `entry_agent`.
    #[must_use]
    pub fn session(
        &self,
        runtime: Arc<dyn AgentRuntime>,
        user: UserContext,
        entry_agent: impl Into<String>,
    ) -> GuardedSession {
        GuardedSession::new(Arc::new(self.runner(runtime)), user, entry_agent)
    }
}
