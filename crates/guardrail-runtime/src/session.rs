//! Per-user conversation state around the guarded runner.

use crate::runner::{GuardedRunner, Rejection, RejectionStage, TurnOutcome};
use guardrail_core::{ConversationItem, SessionId, UserContext};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shown when the user submits a blank prompt.
pub const BLANK_PROMPT_MESSAGE: &str = "Please enter a valid query";

/// A conversation between one user and the agent graph.
///
/// The history only ever grows by whole turns: a prompt is committed
/// together with the agent's reply, and a rejected prompt is never
/// committed. After a rejection the next turn starts at the entry agent
/// again.
#[derive(Debug)]
pub struct GuardedSession {
    id: SessionId,
    runner: Arc<GuardedRunner>,
    user: UserContext,
    entry_agent: String,
    current_agent: String,
    history: Vec<ConversationItem>,
}

impl GuardedSession {
    /// Start a session at `entry_agent`.
    #[must_use]
    pub fn new(runner: Arc<GuardedRunner>, user: UserContext, entry_agent: impl Into<String>) -> Self {
        let entry_agent = entry_agent.into();
        let id = SessionId::generate();
        debug!(session_id = %id, role = %user.role(), entry_agent = %entry_agent, "Session started");
        Self {
            id,
            runner,
            user,
            current_agent: entry_agent.clone(),
            entry_agent,
            history: Vec::new(),
        }
    }

    /// Use a caller-supplied session ID.
    #[must_use]
    pub fn with_id(mut self, id: SessionId) -> Self {
        self.id = id;
        self
    }

    /// Session ID.
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// The session's user.
    #[must_use]
    pub fn user(&self) -> &UserContext {
        &self.user
    }

    /// Agent the session starts at and falls back to.
    #[must_use]
    pub fn entry_agent(&self) -> &str {
        &self.entry_agent
    }

    /// Agent that will receive the next prompt.
    #[must_use]
    pub fn current_agent(&self) -> &str {
        &self.current_agent
    }

    /// Committed conversation history.
    #[must_use]
    pub fn history(&self) -> &[ConversationItem] {
        &self.history
    }

    /// Submit a prompt and run one guarded turn.
    pub async fn submit(&mut self, prompt: &str) -> TurnOutcome {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            debug!(session_id = %self.id, "Blank prompt ignored");
            return TurnOutcome::Rejected(Rejection {
                stage: RejectionStage::Input,
                code: "blank_prompt".to_string(),
                reason: "prompt is blank".to_string(),
                user_message: BLANK_PROMPT_MESSAGE.to_string(),
            });
        }

        let mut candidate = self.history.clone();
        candidate.push(ConversationItem::user(prompt));

        let outcome = self
            .runner
            .run_in_session(&self.current_agent, &candidate, &self.user, Some(&self.id))
            .await;

        match &outcome {
            TurnOutcome::Completed(run) => {
                info!(
                    session_id = %self.id,
                    agent = %run.last_agent,
                    history = run.history.len(),
                    "Turn completed"
                );
                self.current_agent.clone_from(&run.last_agent);
                self.history.clone_from(&run.history);
            }
            TurnOutcome::Rejected(rejection) => {
                warn!(
                    session_id = %self.id,
                    stage = %rejection.stage,
                    code = %rejection.code,
                    "Turn rejected, returning to entry agent"
                );
                self.current_agent.clone_from(&self.entry_agent);
            }
        }

        outcome
    }

    /// Drop the history and return to the entry agent.
    pub fn reset(&mut self) {
        info!(session_id = %self.id, "Session reset");
        self.history.clear();
        self.current_agent.clone_from(&self.entry_agent);
    }
}
