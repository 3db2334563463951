//! The guardrail gate: input and output validation.

use crate::handoff::{ComplianceHandoffFilter, HandoffFilter};
use crate::pii::{PiiPattern, PiiRedactor};
use crate::result::{ValidationCode, ValidationResult};
use crate::sanitize::sanitize_user_content;
use crate::terms::BlockedTerms;
use guardrail_config::ComplianceRules;
use guardrail_core::{ConversationItem, GuardResult, ItemRole};
use serde_json::Value;
use std::borrow::Cow;
use tracing::{debug, error, info, warn};

/// Failure message for an empty input sequence.
pub const INPUT_EMPTY: &str = "Input cannot be empty";
/// Success message for input validation.
pub const INPUT_PASSED: &str = "Input validation passed";
/// Failure message for undecodable input items.
pub const INPUT_ERROR: &str = "Input validation error";
/// Failure message for empty output.
pub const OUTPUT_EMPTY: &str = "Output cannot be empty";
/// Success message for truncated output.
pub const OUTPUT_TRUNCATED: &str = "Output truncated due to length limit";
/// Success message for redacted output.
pub const OUTPUT_REDACTED: &str = "PII redacted from output";
/// Success message for output validation.
pub const OUTPUT_PASSED: &str = "Output validation passed";

/// Marker appended to truncated output.
pub const TRUNCATION_MARKER: &str = "...";

/// Content guardrail shared by every agent in a deployment.
///
/// Built once from [`ComplianceRules`] and then shared read-only
/// (typically as `Arc<GuardrailGate>`).
#[derive(Debug, Clone)]
pub struct GuardrailGate {
    rules: ComplianceRules,
    blocked_terms: BlockedTerms,
    redactor: PiiRedactor,
}

impl GuardrailGate {
    /// Build a gate, compiling the blocked-term matchers.
    ///
    /// # Errors
    /// Returns an error if the rules are invalid.
    pub fn new(rules: ComplianceRules) -> GuardResult<Self> {
        rules.ensure_valid()?;
        let blocked_terms = BlockedTerms::new(&rules.blocked_terms)?;

        debug!(
            blocked_terms = blocked_terms.len(),
            max_response_length = rules.max_response_length,
            require_content_moderation = rules.require_content_moderation,
            "Guardrail gate initialized"
        );

        Ok(Self {
            rules,
            blocked_terms,
            redactor: PiiRedactor::new(),
        })
    }

    /// Build a gate from the default rules.
    ///
    /// # Errors
    /// Returns an error if the default rules fail to compile.
    pub fn with_defaults() -> GuardResult<Self> {
        Self::new(ComplianceRules::default())
    }

    /// Rules in effect.
    #[must_use]
    pub fn rules(&self) -> &ComplianceRules {
        &self.rules
    }

    /// Compiled blocked terms.
    #[must_use]
    pub fn blocked_terms(&self) -> &BlockedTerms {
        &self.blocked_terms
    }

    /// Validate the input sequence sent to an agent.
    ///
    /// User items are checked for blocked terms, then stripped of injection
    /// characters and capped in length. Items of other roles pass through.
    #[must_use]
    pub fn validate_input(&self, items: &[ConversationItem]) -> ValidationResult<Vec<ConversationItem>> {
        if !items.iter().any(ConversationItem::has_content) {
            debug!(items = items.len(), "Rejected empty input");
            return ValidationResult::fail(ValidationCode::Empty, INPUT_EMPTY);
        }

        let mut sanitized_items = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if item.role != ItemRole::User {
                sanitized_items.push(item.clone());
                continue;
            }

            if let Some(term) = self.blocked_terms.find(&item.content) {
                warn!(term, index, "Blocked term detected in input");
                return ValidationResult::fail(
                    ValidationCode::BlockedTerm,
                    format!("Input contains prohibited term: {term}"),
                );
            }

            let sanitized = sanitize_user_content(&item.content);
            if sanitized != item.content {
                info!(
                    index,
                    original_chars = item.content.chars().count(),
                    sanitized_chars = sanitized.chars().count(),
                    "User input sanitized"
                );
            }
            sanitized_items.push(item.with_content(sanitized));
        }

        ValidationResult::pass(ValidationCode::Passed, INPUT_PASSED, sanitized_items)
    }

    /// Validate input supplied in the runtime's dynamic representation.
    ///
    /// Shapes that cannot be decoded into items fail with a generic message;
    /// the decode error is only logged.
    #[must_use]
    pub fn validate_input_value(&self, value: &Value) -> ValidationResult<Vec<ConversationItem>> {
        match ConversationItem::list_from_value(value) {
            Ok(items) => self.validate_input(&items),
            Err(e) => {
                error!(error = %e, "Input validation error");
                ValidationResult::fail(ValidationCode::Malformed, INPUT_ERROR)
            }
        }
    }

    /// Validate an agent's final output.
    ///
    /// Checks run in order and the first one that applies decides the
    /// result: empty, over length (truncated), blocked term, PII (redacted).
    #[must_use]
    pub fn validate_output(&self, output: &str) -> ValidationResult<String> {
        if output.trim().is_empty() {
            debug!("Rejected empty output");
            return ValidationResult::fail(ValidationCode::Empty, OUTPUT_EMPTY);
        }

        let max_chars = self.rules.max_response_length;
        if let Some((cut, _)) = output.char_indices().nth(max_chars) {
            warn!(
                max_chars,
                original_chars = output.chars().count(),
                "Output exceeds length limit, truncating"
            );
            let truncated = format!("{}{TRUNCATION_MARKER}", &output[..cut]);
            return ValidationResult::pass(ValidationCode::Truncated, OUTPUT_TRUNCATED, truncated);
        }

        if let Some(term) = self.blocked_terms.find(output) {
            warn!(term, "Blocked term detected in output");
            return ValidationResult::fail(
                ValidationCode::BlockedTerm,
                format!("Output contains prohibited term: {term}"),
            );
        }

        if let Cow::Owned(redacted) = self.redactor.redact(output) {
            let analysis = self.redactor.analyze(output);
            for pattern in PiiPattern::ALL {
                let count = analysis.count(pattern);
                if count > 0 {
                    warn!(pattern = pattern.name(), count, "PII detected in output, redacting");
                }
            }
            return ValidationResult::pass(ValidationCode::Redacted, OUTPUT_REDACTED, redacted);
        }

        ValidationResult::pass(ValidationCode::Passed, OUTPUT_PASSED, output.to_string())
    }

    /// Sanitize the history handed to another agent with the default
    /// compliance filter.
    #[must_use]
    pub fn filter_handoff_context(&self, history: &[ConversationItem]) -> Vec<ConversationItem> {
        ComplianceHandoffFilter::for_gate(self).filter_history(history)
    }
}
