//! Compliance rules shared by every guardrail check.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::Validate;

/// Compliance rules applied to all agents.
///
/// The recognized options are exactly the four fields below; unknown keys in
/// a rules document are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ComplianceRules {
    /// Terms rejected (input/output) or filtered (handoff) wherever they
    /// appear, compared case-insensitively.
    #[serde(default = "default_blocked_terms")]
    pub blocked_terms: Vec<String>,

    /// Domains agents are expected to cite. Carried for callers; the gate
    /// does not enforce it.
    #[serde(default = "default_allowed_domains")]
    pub allowed_domains: Vec<String>,

    /// Maximum agent response length in characters before truncation.
    #[serde(default = "default_max_response_length")]
    #[validate(range(min = 1, message = "max_response_length must be at least 1"))]
    pub max_response_length: usize,

    /// Whether content moderation is requested for this deployment.
    #[serde(default = "default_true")]
    pub require_content_moderation: bool,
}

fn default_blocked_terms() -> Vec<String> {
    ["credit card", "password", "ssn", "social security"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_allowed_domains() -> Vec<String> {
    ["weather.com", "booking.com", "expedia.com"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_response_length() -> usize {
    1000
}

fn default_true() -> bool {
    true
}

impl Default for ComplianceRules {
    fn default() -> Self {
        Self {
            blocked_terms: default_blocked_terms(),
            allowed_domains: default_allowed_domains(),
            max_response_length: default_max_response_length(),
            require_content_moderation: true,
        }
    }
}

impl ComplianceRules {
    /// Create a builder seeded with the default rules.
    #[must_use]
    pub fn builder() -> ComplianceRulesBuilder {
        ComplianceRulesBuilder::default()
    }

    /// Trim and de-duplicate terms and domains, then validate.
    ///
    /// Duplicates are detected case-insensitively; the first spelling wins so
    /// configuration order is preserved.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if a term is blank or a field is out
    /// of range.
    pub fn into_validated(self) -> ConfigResult<Self> {
        let rules = Self {
            blocked_terms: dedupe_case_insensitive(self.blocked_terms),
            allowed_domains: dedupe_case_insensitive(self.allowed_domains),
            ..self
        };
        rules.ensure_valid()?;
        Ok(rules)
    }

    /// Validate without modifying.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn ensure_valid(&self) -> ConfigResult<()> {
        self.validate()
            .map_err(|e| ConfigError::invalid(e.to_string()))?;

        if let Some(idx) = self.blocked_terms.iter().position(|t| t.trim().is_empty()) {
            return Err(ConfigError::invalid(format!(
                "blocked_terms[{idx}] must not be blank"
            )));
        }

        Ok(())
    }
}

fn dedupe_case_insensitive(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| v.is_empty() || seen.insert(v.to_lowercase()))
        .collect()
}

/// Builder for compliance rules.
#[derive(Debug, Default)]
pub struct ComplianceRulesBuilder {
    rules: ComplianceRules,
}

impl ComplianceRulesBuilder {
    /// Replace the blocked terms.
    #[must_use]
    pub fn blocked_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.blocked_terms = terms.into_iter().map(Into::into).collect();
        self
    }

    /// Add a blocked term.
    #[must_use]
    pub fn blocked_term(mut self, term: impl Into<String>) -> Self {
        self.rules.blocked_terms.push(term.into());
        self
    }

    /// Replace the allowed domains.
    #[must_use]
    pub fn allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.allowed_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Set the maximum response length.
    #[must_use]
    pub fn max_response_length(mut self, length: usize) -> Self {
        self.rules.max_response_length = length;
        self
    }

    /// Set the content moderation flag.
    #[must_use]
    pub fn require_content_moderation(mut self, enabled: bool) -> Self {
        self.rules.require_content_moderation = enabled;
        self
    }

    /// Build and validate the rules.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if the rules are invalid.
    pub fn build(self) -> ConfigResult<ComplianceRules> {
        self.rules.into_validated()
    }
}
