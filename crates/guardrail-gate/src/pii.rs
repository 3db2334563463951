//! PII redaction for agent output.
//!
//! Two shapes are recognized:
//! - US Social Security Numbers written as `123-45-6789`
//! - card numbers written as 16 contiguous digits
//!
//! Every match is replaced with [`REDACTION`]. Callers should log the
//! [`PiiAnalysis`] counts, never the matched values.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::borrow::Cow;

/// Replacement text for redacted values.
pub const REDACTION: &str = "[REDACTED]";

static SSN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap());

static CARD_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{16}\b").unwrap());

/// PII pattern types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PiiPattern {
    /// Social Security Number
    Ssn,
    /// Payment card number
    CardNumber,
}

impl PiiPattern {
    /// All patterns, in the order they are applied.
    pub const ALL: [Self; 2] = [Self::Ssn, Self::CardNumber];

    /// Pattern name for logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ssn => "ssn",
            Self::CardNumber => "card_number",
        }
    }

    fn regex(self) -> &'static Regex {
        match self {
            Self::Ssn => &*SSN_REGEX,
            Self::CardNumber => &*CARD_NUMBER_REGEX,
        }
    }
}

/// Counts of PII found in a text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PiiAnalysis {
    /// Number of SSNs found
    pub ssn_count: usize,
    /// Number of card numbers found
    pub card_number_count: usize,
}

impl PiiAnalysis {
    /// Matches of one pattern.
    #[must_use]
    pub fn count(&self, pattern: PiiPattern) -> usize {
        match pattern {
            PiiPattern::Ssn => self.ssn_count,
            PiiPattern::CardNumber => self.card_number_count,
        }
    }

    /// Total matches.
    #[must_use]
    pub fn total(&self) -> usize {
        self.ssn_count + self.card_number_count
    }
}

/// Redacts SSN and card-number shapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PiiRedactor;

impl PiiRedactor {
    /// Create a redactor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Replace every PII match with [`REDACTION`].
    ///
    /// Returns the input unchanged (borrowed) when nothing matched.
    #[must_use]
    pub fn redact<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut result = Cow::Borrowed(text);
        for pattern in PiiPattern::ALL {
            let regex = pattern.regex();
            if regex.is_match(&result) {
                let replaced = regex.replace_all(&result, NoExpand(REDACTION)).into_owned();
                result = Cow::Owned(replaced);
            }
        }
        result
    }

    /// Count PII matches without modifying the text.
    #[must_use]
    pub fn analyze(&self, text: &str) -> PiiAnalysis {
        PiiAnalysis {
            ssn_count: SSN_REGEX.find_iter(text).count(),
            card_number_count: CARD_NUMBER_REGEX.find_iter(text).count(),
        }
    }
}
