//! Caller identity used for handoff access control.

use crate::error::{GuardError, GuardResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

/// Names are letters and spaces only.
static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z\s]+$").unwrap());

/// Role of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    /// Administrator; may reach the booking agents
    #[serde(rename = "admin")]
    Admin,
    /// Unrestricted user
    #[serde(rename = "super user", alias = "super_user", alias = "super-user")]
    SuperUser,
    /// Basic user; may only reach the designated public agent
    #[serde(rename = "basic")]
    Basic,
}

impl UserRole {
    /// Canonical string form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::SuperUser => "super user",
            Self::Basic => "basic",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "super user" | "super_user" | "super-user" => Ok(Self::SuperUser),
            "basic" => Ok(Self::Basic),
            other => Err(GuardError::invalid_user(format!("unknown role '{other}'"))),
        }
    }
}

/// Unvalidated user fields, as supplied by the caller.
#[derive(Debug, Clone, Deserialize, Validate)]
struct UserFields {
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    name: String,
    role: UserRole,
    #[validate(range(max = 120, message = "must be between 0 and 120"))]
    age: u8,
}

/// Validated, immutable caller identity.
///
/// Built once per session through [`UserContext::new`] (or deserialization,
/// which runs the same checks).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserFields")]
pub struct UserContext {
    name: String,
    role: UserRole,
    age: u8,
}

impl UserContext {
    /// Validate and build a user context.
    ///
    /// The name must be 1-50 characters of letters and spaces and is stored
    /// in title case; the age must be within 0-120.
    ///
    /// # Errors
    /// Returns [`GuardError::InvalidUser`] if any field is out of bounds.
    pub fn new(name: impl Into<String>, role: UserRole, age: u8) -> GuardResult<Self> {
        Self::try_from(UserFields {
            name: name.into(),
            role,
            age,
        })
    }

    /// Display name in title case.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Caller role.
    #[must_use]
    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Caller age in years.
    #[must_use]
    pub fn age(&self) -> u8 {
        self.age
    }

    /// Whether the caller is below the given age.
    #[must_use]
    pub fn is_under(&self, age: u8) -> bool {
        self.age < age
    }
}

impl TryFrom<UserFields> for UserContext {
    type Error = GuardError;

    fn try_from(fields: UserFields) -> Result<Self, Self::Error> {
        fields
            .validate()
            .map_err(|e| GuardError::invalid_user(e.to_string()))?;

        if !NAME_PATTERN.is_match(&fields.name) {
            return Err(GuardError::invalid_user(
                "name must contain only letters and spaces",
            ));
        }

        Ok(Self {
            name: title_case(&fields.name),
            role: fields.role,
            age: fields.age,
        })
    }
}

/// Upper-case the first letter of every word, lower-case the rest.
fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;
    for c in input.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
