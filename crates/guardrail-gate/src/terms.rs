//! Case-insensitive blocked-term matching.

use guardrail_core::{GuardError, GuardResult};
use regex::{NoExpand, Regex, RegexBuilder};
use std::borrow::Cow;

/// A configured term and its compiled matcher.
#[derive(Debug, Clone)]
struct TermMatcher {
    term: String,
    regex: Regex,
}

/// Blocked terms compiled once, kept in configuration order.
#[derive(Debug, Clone, Default)]
pub struct BlockedTerms {
    matchers: Vec<TermMatcher>,
}

impl BlockedTerms {
    /// Compile the given terms. Terms are matched literally.
    ///
    /// # Errors
    /// Returns [`GuardError::Internal`] if a matcher cannot be built.
    pub fn new<I, S>(terms: I) -> GuardResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let matchers = terms
            .into_iter()
            .map(|term| {
                let term = term.as_ref();
                RegexBuilder::new(&regex::escape(term))
                    .case_insensitive(true)
                    .build()
                    .map(|regex| TermMatcher {
                        term: term.to_string(),
                        regex,
                    })
                    .map_err(|e| {
                        GuardError::internal(format!("cannot compile blocked term matcher: {e}"))
                    })
            })
            .collect::<GuardResult<Vec<_>>>()?;

        Ok(Self { matchers })
    }

    /// First configured term that occurs in `text`.
    #[must_use]
    pub fn find<'a>(&'a self, text: &str) -> Option<&'a str> {
        self.matchers
            .iter()
            .find(|m| m.regex.is_match(text))
            .map(|m| m.term.as_str())
    }

    /// Replace every occurrence of every term with `replacement`.
    #[must_use]
    pub fn replace_all<'t>(&self, text: &'t str, replacement: &str) -> Cow<'t, str> {
        let mut result = Cow::Borrowed(text);
        for matcher in &self.matchers {
            if matcher.regex.is_match(&result) {
                let replaced = matcher
                    .regex
                    .replace_all(&result, NoExpand(replacement))
                    .into_owned();
                result = Cow::Owned(replaced);
            }
        }
        result
    }

    /// Number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Whether no terms are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}
