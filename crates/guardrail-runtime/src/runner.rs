//! Guarded agent turns.
//!
//! A turn validates the input, runs the agent on the sanitized input,
//! validates the final output and substitutes the modified output. Policy
//! violations and runtime failures both end in a [`Rejection`] carrying a
//! fixed apology for the user.

use async_trait::async_trait;
use guardrail_core::{ConversationItem, ItemRole, SessionId, UserContext};
use guardrail_gate::{GuardrailGate, ValidationCode, ValidationResult};
use guardrail_telemetry::{AuditEventBuilder, AuditLogger, AuditOutcome, AuditStage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Shown when input validation rejects a turn.
pub const INPUT_APOLOGY: &str =
    "I apologize, but I cannot process this request due to content restrictions.";
/// Shown when output validation rejects a turn.
pub const OUTPUT_APOLOGY: &str =
    "I apologize, but I cannot provide this response due to content restrictions.";
/// Shown when the turn fails unexpectedly.
pub const SYSTEM_APOLOGY: &str =
    "I apologize, but I'm experiencing technical difficulties. Please try again later.";

/// Result of running an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRun {
    /// Final text output
    pub final_output: String,
    /// Agent that produced the output, after any handoffs
    pub last_agent: String,
    /// Full conversation after the run, as input for the next turn
    pub history: Vec<ConversationItem>,
}

/// External agent runtime.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Run `agent` on `input` on behalf of `user`.
    async fn run(
        &self,
        agent: &str,
        input: Vec<ConversationItem>,
        user: &UserContext,
    ) -> anyhow::Result<AgentRun>;
}

/// Where a turn was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectionStage {
    /// Input validation
    Input,
    /// Output validation
    Output,
    /// Runtime failure
    System,
}

impl std::fmt::Display for RejectionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
            Self::System => write!(f, "system"),
        }
    }
}

/// A rejected turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Stage that rejected the turn
    pub stage: RejectionStage,
    /// Machine-readable reason code
    pub code: String,
    /// Internal reason, for logs
    pub reason: String,
    /// Text to show the user
    pub user_message: String,
}

impl Rejection {
    /// Rejection by input validation.
    #[must_use]
    pub fn input(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            stage: RejectionStage::Input,
            code: code.into(),
            reason: reason.into(),
            user_message: INPUT_APOLOGY.to_string(),
        }
    }

    /// Rejection by output validation.
    #[must_use]
    pub fn output(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            stage: RejectionStage::Output,
            code: code.into(),
            reason: reason.into(),
            user_message: OUTPUT_APOLOGY.to_string(),
        }
    }

    /// Rejection after an unexpected failure.
    #[must_use]
    pub fn system(reason: impl Into<String>) -> Self {
        Self {
            stage: RejectionStage::System,
            code: "system_error".to_string(),
            reason: reason.into(),
            user_message: SYSTEM_APOLOGY.to_string(),
        }
    }

    fn from_validation<T>(stage: RejectionStage, result: &ValidationResult<T>) -> Self {
        let code = result.code().as_str();
        match stage {
            RejectionStage::Input => Self::input(code, result.message()),
            RejectionStage::Output => Self::output(code, result.message()),
            RejectionStage::System => Self::system(result.message()),
        }
    }

    /// Reason that may be shown alongside the apology.
    ///
    /// Only input rejections expose their reason; it names the offending
    /// term the user typed.
    #[must_use]
    pub fn public_reason(&self) -> Option<String> {
        match self.stage {
            RejectionStage::Input => Some(format!("Input validation failed: {}", self.reason)),
            RejectionStage::Output | RejectionStage::System => None,
        }
    }
}

/// Outcome of a guarded turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The agent ran and its output passed validation
    Completed(AgentRun),
    /// The turn was rejected
    Rejected(Rejection),
}

impl TurnOutcome {
    /// Whether the turn completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Text to show the user: the final output or the apology.
    #[must_use]
    pub fn reply(&self) -> &str {
        match self {
            Self::Completed(run) => &run.final_output,
            Self::Rejected(rejection) => &rejection.user_message,
        }
    }

    /// The completed run, if any.
    #[must_use]
    pub fn run(&self) -> Option<&AgentRun> {
        match self {
            Self::Completed(run) => Some(run),
            Self::Rejected(_) => None,
        }
    }

    /// The rejection, if any.
    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Completed(_) => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }
}

/// Wraps an [`AgentRuntime`] with input and output validation.
#[derive(Clone)]
pub struct GuardedRunner {
    gate: Arc<GuardrailGate>,
    runtime: Arc<dyn AgentRuntime>,
    audit: AuditLogger,
}

impl std::fmt::Debug for GuardedRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedRunner")
            .field("gate", &self.gate)
            .field("audit", &self.audit)
            .finish_non_exhaustive()
    }
}

impl GuardedRunner {
    /// Create a runner with auditing disabled.
    #[must_use]
    pub fn new(gate: Arc<GuardrailGate>, runtime: Arc<dyn AgentRuntime>) -> Self {
        Self {
            gate,
            runtime,
            audit: AuditLogger::disabled(),
        }
    }

    /// Record decisions in the given audit log.
    #[must_use]
    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = audit;
        self
    }

    /// Gate in use.
    #[must_use]
    pub fn gate(&self) -> &Arc<GuardrailGate> {
        &self.gate
    }

    /// Audit log in use.
    #[must_use]
    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Run one guarded turn.
    pub async fn run(
        &self,
        agent: &str,
        input: &[ConversationItem],
        user: &UserContext,
    ) -> TurnOutcome {
        self.run_in_session(agent, input, user, None).await
    }

    /// Run one guarded turn, tagging audit events with a session.
    #[instrument(skip(self, input, user, session_id), fields(items = input.len()))]
    pub async fn run_in_session(
        &self,
        agent: &str,
        input: &[ConversationItem],
        user: &UserContext,
        session_id: Option<&SessionId>,
    ) -> TurnOutcome {
        let validated = self.gate.validate_input(input);
        self.record(AuditStage::Input, &validated, agent, user, session_id)
            .await;
        if !validated.passed() {
            warn!(code = %validated.code(), "Input validation failed");
            return TurnOutcome::Rejected(Rejection::from_validation(
                RejectionStage::Input,
                &validated,
            ));
        }
        let validated_input = validated.into_modified().unwrap_or_else(|| input.to_vec());

        let mut run = match self.runtime.run(agent, validated_input, user).await {
            Ok(run) => run,
            Err(e) => {
                error!(error = %e, "Agent runtime failed");
                let rejection = Rejection::system(e.to_string());
                self.record_system(&rejection, agent, user, session_id).await;
                return TurnOutcome::Rejected(rejection);
            }
        };

        let checked = self.gate.validate_output(&run.final_output);
        self.record(AuditStage::Output, &checked, &run.last_agent, user, session_id)
            .await;
        if !checked.passed() {
            warn!(code = %checked.code(), last_agent = %run.last_agent, "Output validation failed");
            return TurnOutcome::Rejected(Rejection::from_validation(
                RejectionStage::Output,
                &checked,
            ));
        }

        if let Some(output) = checked.into_modified() {
            if output != run.final_output {
                replace_last_reply(&mut run.history, &run.final_output, &output);
                run.final_output = output;
            }
        }

        debug!(last_agent = %run.last_agent, history = run.history.len(), "Turn completed");
        TurnOutcome::Completed(run)
    }

    async fn record<T>(
        &self,
        stage: AuditStage,
        result: &ValidationResult<T>,
        agent: &str,
        user: &UserContext,
        session_id: Option<&SessionId>,
    ) {
        if !self.audit.is_enabled() {
            return;
        }

        let outcome = match result.code() {
            code if code.is_failure() => AuditOutcome::Rejected,
            ValidationCode::Passed => AuditOutcome::Passed,
            _ => AuditOutcome::Modified,
        };

        let mut builder = AuditEventBuilder::new(stage)
            .outcome(outcome)
            .code(result.code().as_str())
            .description(result.message())
            .agent(agent)
            .user_role(user.role());
        if let Some(id) = session_id {
            builder = builder.session_id(id.clone());
        }
        self.audit.log_event(builder).await;
    }

    async fn record_system(
        &self,
        rejection: &Rejection,
        agent: &str,
        user: &UserContext,
        session_id: Option<&SessionId>,
    ) {
        let mut builder = AuditEventBuilder::new(AuditStage::System)
            .outcome(AuditOutcome::Error)
            .code(rejection.code.clone())
            .description("Agent runtime failed")
            .agent(agent)
            .user_role(user.role());
        if let Some(id) = session_id {
            builder = builder.session_id(id.clone());
        }
        self.audit.log_event(builder).await;
    }
}

/// Keep the history consistent with a modified final output.
fn replace_last_reply(history: &mut [ConversationItem], original: &str, replacement: &str) {
    if let Some(item) = history
        .iter_mut()
        .rev()
        .find(|item| item.role == ItemRole::Assistant)
    {
        if item.content == original {
            item.content = replacement.to_string();
        }
    }
}
