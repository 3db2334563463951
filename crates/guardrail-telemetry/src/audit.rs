//! Audit trail of guardrail decisions.
//!
//! Every input/output validation, handoff decision and system failure can be
//! recorded as a [`GuardrailAuditEvent`]. Events are emitted as structured
//! `tracing` output on the `audit` target and kept in a bounded in-memory
//! buffer for inspection.
//!
//! Events never carry conversation content or user names.

use chrono::{DateTime, Utc};
use guardrail_core::{SessionId, UserRole};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Point in a turn where the decision was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStage {
    /// Input validation
    Input,
    /// Output validation
    Output,
    /// Handoff permission
    Handoff,
    /// Unexpected failure around the agent run
    System,
}

impl std::fmt::Display for AuditStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
            Self::Handoff => write!(f, "handoff"),
            Self::System => write!(f, "system"),
        }
    }
}

/// Decision recorded by an audit event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    /// Content accepted unchanged
    Passed,
    /// Content accepted after modification
    Modified,
    /// Content rejected
    Rejected,
    /// Handoff denied
    Denied,
    /// Processing failed
    Error,
}

impl AuditOutcome {
    /// Whether the outcome should be surfaced at warning level.
    #[must_use]
    pub fn is_adverse(self) -> bool {
        matches!(self, Self::Rejected | Self::Denied | Self::Error)
    }
}

impl std::fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Modified => write!(f, "modified"),
            Self::Rejected => write!(f, "rejected"),
            Self::Denied => write!(f, "denied"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A recorded guardrail decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailAuditEvent {
    /// Unique event identifier
    pub id: String,
    /// Event timestamp
    pub timestamp: DateTime<Utc>,
    /// Stage of the decision
    pub stage: AuditStage,
    /// Decision
    pub outcome: AuditOutcome,
    /// Machine-readable reason code
    pub code: String,
    /// Short description
    pub description: String,
    /// Agent involved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// Role of the user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_role: Option<UserRole>,
    /// Session for correlation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    /// Additional metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Builder for audit events
#[derive(Debug)]
pub struct AuditEventBuilder {
    stage: AuditStage,
    outcome: AuditOutcome,
    code: Option<String>,
    description: Option<String>,
    agent: Option<String>,
    user_role: Option<UserRole>,
    session_id: Option<SessionId>,
    metadata: HashMap<String, serde_json::Value>,
}

impl AuditEventBuilder {
    /// Create a builder for a stage; the outcome defaults to passed
    #[must_use]
    pub fn new(stage: AuditStage) -> Self {
        Self {
            stage,
            outcome: AuditOutcome::Passed,
            code: None,
            description: None,
            agent: None,
            user_role: None,
            session_id: None,
            metadata: HashMap::new(),
        }
    }

    /// Set outcome
    #[must_use]
    pub fn outcome(mut self, outcome: AuditOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Set reason code
    #[must_use]
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set agent
    #[must_use]
    pub fn agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Set user role
    #[must_use]
    pub fn user_role(mut self, role: UserRole) -> Self {
        self.user_role = Some(role);
        self
    }

    /// Set session
    #[must_use]
    pub fn session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Add metadata
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), json_value);
        }
        self
    }

    /// Build the audit event
    #[must_use]
    pub fn build(self) -> GuardrailAuditEvent {
        let code = self.code.unwrap_or_else(|| self.outcome.to_string());
        GuardrailAuditEvent {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            stage: self.stage,
            outcome: self.outcome,
            description: self
                .description
                .unwrap_or_else(|| format!("{} {}", self.stage, self.outcome)),
            code,
            agent: self.agent,
            user_role: self.user_role,
            session_id: self.session_id,
            metadata: self.metadata,
        }
    }
}

/// Audit log configuration
#[derive(Debug, Clone)]
pub struct AuditLogConfig {
    /// Whether audit logging is enabled
    pub enabled: bool,
    /// Emit events through `tracing`
    pub log_to_stdout: bool,
    /// Maximum events to keep in memory buffer
    pub buffer_size: usize,
}

impl Default for AuditLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_to_stdout: true,
            buffer_size: 1000,
        }
    }
}

/// Audit logger for guardrail decisions
#[derive(Debug, Clone)]
pub struct AuditLogger {
    config: AuditLogConfig,
    buffer: Arc<RwLock<VecDeque<GuardrailAuditEvent>>>,
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl AuditLogger {
    /// Create a new audit logger
    #[must_use]
    pub fn new(config: AuditLogConfig) -> Self {
        Self {
            config,
            buffer: Arc::new(RwLock::new(VecDeque::new())),
        }
    }

    /// Create with default configuration
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(AuditLogConfig::default())
    }

    /// Create a disabled audit logger
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(AuditLogConfig {
            enabled: false,
            ..Default::default()
        })
    }

    /// Check if audit logging is enabled
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Record an event
    pub async fn log(&self, event: GuardrailAuditEvent) {
        if !self.config.enabled {
            return;
        }

        if self.config.log_to_stdout {
            Self::log_to_stdout(&event);
        }

        self.store_in_buffer(event).await;
    }

    /// Build and record an event
    pub async fn log_event(&self, builder: AuditEventBuilder) {
        self.log(builder.build()).await;
    }

    /// Record a handoff decision
    pub async fn log_handoff(
        &self,
        session_id: Option<&SessionId>,
        role: UserRole,
        target_agent: &str,
        allowed: bool,
    ) {
        let (outcome, code) = if allowed {
            (AuditOutcome::Passed, "handoff_allowed")
        } else {
            (AuditOutcome::Denied, "handoff_denied")
        };

        let mut builder = AuditEventBuilder::new(AuditStage::Handoff)
            .outcome(outcome)
            .code(code)
            .agent(target_agent)
            .user_role(role)
            .description(format!("Handoff to {target_agent} {outcome}"));

        if let Some(id) = session_id {
            builder = builder.session_id(id.clone());
        }

        self.log(builder.build()).await;
    }

    /// Get recent events, newest first
    pub async fn get_recent_events(&self, limit: usize) -> Vec<GuardrailAuditEvent> {
        let buffer = self.buffer.read().await;
        buffer.iter().rev().take(limit).cloned().collect()
    }

    /// Get events for one stage, newest first
    pub async fn get_events_by_stage(
        &self,
        stage: AuditStage,
        limit: usize,
    ) -> Vec<GuardrailAuditEvent> {
        let buffer = self.buffer.read().await;
        buffer
            .iter()
            .rev()
            .filter(|e| e.stage == stage)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Number of buffered events
    pub async fn len(&self) -> usize {
        self.buffer.read().await.len()
    }

    /// Whether the buffer is empty
    pub async fn is_empty(&self) -> bool {
        self.buffer.read().await.is_empty()
    }

    /// Clear the event buffer
    pub async fn clear_buffer(&self) {
        self.buffer.write().await.clear();
    }

    fn log_to_stdout(event: &GuardrailAuditEvent) {
        let json = serde_json::to_string(event).unwrap_or_else(|_| format!("{event:?}"));

        if event.outcome.is_adverse() {
            warn!(
                target: "audit",
                stage = %event.stage,
                outcome = %event.outcome,
                code = %event.code,
                "{}",
                json
            );
        } else {
            info!(
                target: "audit",
                stage = %event.stage,
                outcome = %event.outcome,
                code = %event.code,
                "{}",
                json
            );
        }
    }

    async fn store_in_buffer(&self, event: GuardrailAuditEvent) {
        if self.config.buffer_size == 0 {
            return;
        }

        let mut buffer = self.buffer.write().await;
        while buffer.len() >= self.config.buffer_size {
            buffer.pop_front();
        }
        buffer.push_back(event);
    }
}
