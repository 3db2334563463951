//! # Guardrail Config
//!
//! Compliance rule configuration for the agent guardrail gate.
//!
//! Rules are loaded once at startup (from defaults, a YAML/TOML/JSON file,
//! and `GUARDRAIL_*` environment overrides), validated, and then shared
//! read-only by every gate invocation.
//!
//! ## Example
//!
//! ```rust
//! use guardrail_config::ComplianceRules;
//!
//! let rules = ComplianceRules::builder()
//!     .blocked_term("passport number")
//!     .max_response_length(500)
//!     .build()
//!     .expect("valid rules");
//! assert!(rules.blocked_terms.iter().any(|t| t == "passport number"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod rules;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    apply_env_overrides, load_rules, load_rules_from_env, ConfigFormat, EnvOverrides,
    RULES_PATH_ENV,
};
pub use rules::{ComplianceRules, ComplianceRulesBuilder};
