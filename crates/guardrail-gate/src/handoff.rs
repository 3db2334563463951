//! Handoff guardrails.
//!
//! A handoff moves a conversation from one agent to another. Two hooks are
//! exposed to the agent runtime:
//! - [`HandoffPolicy::is_enabled`], asked before the handoff is offered
//! - [`HandoffFilter::apply`], run over the data passed to the next agent

use crate::gate::GuardrailGate;
use crate::terms::BlockedTerms;
use guardrail_core::{ConversationItem, ItemRole, SessionId, UserContext, UserRole};
use guardrail_telemetry::AuditLogger;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Flight booking agent name.
pub const FLIGHT_AGENT: &str = "FlightAgent";
/// Hotel booking agent name.
pub const HOTEL_AGENT: &str = "HotelAgent";
/// Weather agent name.
pub const WEATHER_AGENT: &str = "WeatherAgent";

/// Minimum age for any handoff.
pub const MIN_HANDOFF_AGE: u8 = 18;
/// Number of trailing history items passed along a handoff.
pub const HANDOFF_HISTORY_WINDOW: usize = 2;
/// Replacement for blocked terms in handoff history.
pub const FILTERED: &str = "[FILTERED]";

/// Decides whether a user may be handed off to an agent.
pub trait HandoffPolicy: Send + Sync + fmt::Debug {
    /// Whether the handoff to `target_agent` is offered to `user`.
    fn is_enabled(&self, user: &UserContext, target_agent: &str) -> bool;
}

/// Role-based handoff access control.
///
/// Users below the minimum age are always denied. Super users may reach any
/// agent; admins and basic users only the agents listed for their role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleBasedHandoffPolicy {
    min_age: u8,
    admin_agents: Vec<String>,
    basic_agents: Vec<String>,
}

impl Default for RoleBasedHandoffPolicy {
    fn default() -> Self {
        Self {
            min_age: MIN_HANDOFF_AGE,
            admin_agents: vec![FLIGHT_AGENT.to_string(), HOTEL_AGENT.to_string()],
            basic_agents: vec![WEATHER_AGENT.to_string()],
        }
    }
}

impl RoleBasedHandoffPolicy {
    /// Create the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum age.
    #[must_use]
    pub fn with_min_age(mut self, age: u8) -> Self {
        self.min_age = age;
        self
    }

    /// Replace the agents admins may reach.
    #[must_use]
    pub fn with_admin_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.admin_agents = agents.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the agents basic users may reach.
    #[must_use]
    pub fn with_basic_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.basic_agents = agents.into_iter().map(Into::into).collect();
        self
    }

    fn role_allows(&self, role: UserRole, target_agent: &str) -> bool {
        match role {
            UserRole::SuperUser => true,
            UserRole::Admin => self.admin_agents.iter().any(|a| a == target_agent),
            UserRole::Basic => self.basic_agents.iter().any(|a| a == target_agent),
        }
    }
}

impl HandoffPolicy for RoleBasedHandoffPolicy {
    fn is_enabled(&self, user: &UserContext, target_agent: &str) -> bool {
        if user.is_under(self.min_age) {
            warn!(
                target_agent,
                min_age = self.min_age,
                "Handoff denied: user below minimum age"
            );
            return false;
        }

        let allowed = self.role_allows(user.role(), target_agent);
        if !allowed {
            warn!(role = %user.role(), target_agent, "Handoff not permitted for role");
        }
        allowed
    }
}

/// Evaluate a handoff with the default role-based policy.
#[must_use]
pub fn evaluate_handoff_permission(user: &UserContext, target_agent: &str) -> bool {
    RoleBasedHandoffPolicy::default().is_enabled(user, target_agent)
}

/// Data handed to the next agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffInputData {
    /// Conversation history before the current run
    pub input_history: Vec<ConversationItem>,
    /// Items generated in the current run before the handoff
    pub pre_handoff_items: Vec<ConversationItem>,
    /// Items generated by the handoff itself
    pub new_items: Vec<ConversationItem>,
}

impl HandoffInputData {
    /// Create handoff data with only a history.
    #[must_use]
    pub fn from_history(input_history: Vec<ConversationItem>) -> Self {
        Self {
            input_history,
            ..Self::default()
        }
    }
}

/// Transforms the data passed along a handoff.
pub trait HandoffFilter: Send + Sync + fmt::Debug {
    /// Filter a conversation history.
    fn filter_history(&self, history: &[ConversationItem]) -> Vec<ConversationItem>;

    /// Filter handoff data. By default only the history is filtered.
    fn apply(&self, data: &HandoffInputData) -> HandoffInputData {
        HandoffInputData {
            input_history: self.filter_history(&data.input_history),
            pre_handoff_items: data.pre_handoff_items.clone(),
            new_items: data.new_items.clone(),
        }
    }
}

/// Keeps the most recent items and masks blocked terms in dialogue.
#[derive(Debug, Clone)]
pub struct ComplianceHandoffFilter {
    blocked_terms: BlockedTerms,
    window: usize,
}

impl ComplianceHandoffFilter {
    /// Create a filter over the given terms with the default window.
    #[must_use]
    pub fn new(blocked_terms: BlockedTerms) -> Self {
        Self {
            blocked_terms,
            window: HANDOFF_HISTORY_WINDOW,
        }
    }

    /// Create a filter sharing the gate's blocked terms.
    #[must_use]
    pub fn for_gate(gate: &GuardrailGate) -> Self {
        Self::new(gate.blocked_terms().clone())
    }

    /// Set how many trailing items are kept.
    #[must_use]
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }
}

impl HandoffFilter for ComplianceHandoffFilter {
    fn filter_history(&self, history: &[ConversationItem]) -> Vec<ConversationItem> {
        let recent = &history[history.len().saturating_sub(self.window)..];
        let mut masked = 0usize;

        let filtered = recent
            .iter()
            .map(|item| {
                if !item.role.is_dialogue() {
                    return item.clone();
                }
                let content = self.blocked_terms.replace_all(&item.content, FILTERED);
                if content == item.content.as_str() {
                    item.clone()
                } else {
                    masked += 1;
                    item.with_content(content)
                }
            })
            .collect();

        debug!(
            original_items = history.len(),
            kept_items = recent.len(),
            masked_items = masked,
            "Handoff history filtered"
        );

        filtered
    }
}

/// Drops tool items from every part of the handoff data.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolItemFilter;

impl ToolItemFilter {
    fn without_tools(items: &[ConversationItem]) -> Vec<ConversationItem> {
        items
            .iter()
            .filter(|item| item.role != ItemRole::Tool)
            .cloned()
            .collect()
    }
}

impl HandoffFilter for ToolItemFilter {
    fn filter_history(&self, history: &[ConversationItem]) -> Vec<ConversationItem> {
        Self::without_tools(history)
    }

    fn apply(&self, data: &HandoffInputData) -> HandoffInputData {
        HandoffInputData {
            input_history: Self::without_tools(&data.input_history),
            pre_handoff_items: Self::without_tools(&data.pre_handoff_items),
            new_items: Self::without_tools(&data.new_items),
        }
    }
}

/// Runs filters in order, each over the previous one's output.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    filters: Vec<Arc<dyn HandoffFilter>>,
}

impl FilterChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter.
    #[must_use]
    pub fn then(mut self, filter: impl HandoffFilter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Number of filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the chain has no filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl HandoffFilter for FilterChain {
    fn filter_history(&self, history: &[ConversationItem]) -> Vec<ConversationItem> {
        self.filters
            .iter()
            .fold(history.to_vec(), |items, filter| filter.filter_history(&items))
    }

    fn apply(&self, data: &HandoffInputData) -> HandoffInputData {
        self.filters
            .iter()
            .fold(data.clone(), |current, filter| filter.apply(&current))
    }
}

/// Policy and filter registered together on a handoff.
///
/// With an audit log attached, [`HandoffGuard::authorize_audited`] records
/// every allow/deny decision.
#[derive(Debug, Clone)]
pub struct HandoffGuard {
    policy: Arc<dyn HandoffPolicy>,
    filter: Arc<dyn HandoffFilter>,
    audit: Option<AuditLogger>,
}

impl HandoffGuard {
    /// Pair a policy with a filter.
    #[must_use]
    pub fn new(policy: Arc<dyn HandoffPolicy>, filter: Arc<dyn HandoffFilter>) -> Self {
        Self {
            policy,
            filter,
            audit: None,
        }
    }

    /// Default guard for a gate: role-based policy, tool removal, then the
    /// compliance filter.
    #[must_use]
    pub fn for_gate(gate: &GuardrailGate) -> Self {
        let filter = FilterChain::new()
            .then(ToolItemFilter)
            .then(ComplianceHandoffFilter::for_gate(gate));
        Self::new(Arc::new(RoleBasedHandoffPolicy::default()), Arc::new(filter))
    }

    /// Record handoff decisions in `audit`.
    #[must_use]
    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Whether the handoff may be offered.
    #[must_use]
    pub fn authorize(&self, user: &UserContext, target_agent: &str) -> bool {
        self.policy.is_enabled(user, target_agent)
    }

    /// Decide the handoff and record the decision in the audit log, if any.
    pub async fn authorize_audited(
        &self,
        user: &UserContext,
        target_agent: &str,
        session_id: Option<&SessionId>,
    ) -> bool {
        let allowed = self.authorize(user, target_agent);
        if let Some(audit) = &self.audit {
            audit
                .log_handoff(session_id, user.role(), target_agent, allowed)
                .await;
        }
        allowed
    }

    /// Prepare the data handed to the next agent.
    #[must_use]
    pub fn prepare(&self, data: &HandoffInputData) -> HandoffInputData {
        self.filter.apply(data)
    }

    /// Policy in use.
    #[must_use]
    pub fn policy(&self) -> &Arc<dyn HandoffPolicy> {
        &self.policy
    }

    /// Filter in use.
    #[must_use]
    pub fn filter(&self) -> &Arc<dyn HandoffFilter> {
        &self.filter
    }

    /// Audit log receiving handoff decisions.
    #[must_use]
    pub fn audit(&self) -> Option<&AuditLogger> {
        self.audit.as_ref()
    }
}
