//! Loading compliance rules from files and the environment.
//!
//! Precedence, lowest to highest: built-in defaults, rules file,
//! `GUARDRAIL_*` environment overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::rules::ComplianceRules;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable naming the rules file.
pub const RULES_PATH_ENV: &str = "GUARDRAIL_RULES_PATH";

const BLOCKED_TERMS_ENV: &str = "GUARDRAIL_BLOCKED_TERMS";
const ALLOWED_DOMAINS_ENV: &str = "GUARDRAIL_ALLOWED_DOMAINS";
const MAX_RESPONSE_LENGTH_ENV: &str = "GUARDRAIL_MAX_RESPONSE_LENGTH";
const REQUIRE_MODERATION_ENV: &str = "GUARDRAIL_REQUIRE_MODERATION";

/// Rules document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML (`.yaml`, `.yml`)
    Yaml,
    /// TOML (`.toml`)
    Toml,
    /// JSON (`.json`)
    Json,
}

impl ConfigFormat {
    /// Detect the format from a file extension.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Format name used in error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Toml => "toml",
            Self::Json => "json",
        }
    }
}

impl ComplianceRules {
    /// Parse and validate rules from a document in the given format.
    ///
    /// # Errors
    /// Returns a parse error or a validation error.
    pub fn from_str_as(content: &str, format: ConfigFormat) -> ConfigResult<Self> {
        let rules: Self = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| ConfigError::parse(format.name(), e))?,
            ConfigFormat::Toml => {
                toml::from_str(content).map_err(|e| ConfigError::parse(format.name(), e))?
            }
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::parse(format.name(), e))?,
        };
        rules.into_validated()
    }

    /// Parse rules from YAML.
    ///
    /// # Errors
    /// Returns a parse error or a validation error.
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        Self::from_str_as(content, ConfigFormat::Yaml)
    }

    /// Parse rules from TOML.
    ///
    /// # Errors
    /// Returns a parse error or a validation error.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Self::from_str_as(content, ConfigFormat::Toml)
    }

    /// Parse rules from JSON.
    ///
    /// # Errors
    /// Returns a parse error or a validation error.
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        Self::from_str_as(content, ConfigFormat::Json)
    }
}

/// Load rules from a file, choosing the parser by extension.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed or validated.
pub async fn load_rules(path: impl AsRef<Path>) -> ConfigResult<ComplianceRules> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let rules = ComplianceRules::from_str_as(&content, format)?;

    info!(
        path = %path.display(),
        format = format.name(),
        blocked_terms = rules.blocked_terms.len(),
        max_response_length = rules.max_response_length,
        "Compliance rules loaded"
    );

    Ok(rules)
}

/// Load rules the way a deployment starts up: the file named by
/// `GUARDRAIL_RULES_PATH` (or the defaults when unset), then environment
/// overrides.
///
/// # Errors
/// Returns an error if the file or any override is invalid.
pub async fn load_rules_from_env() -> ConfigResult<ComplianceRules> {
    let base = match std::env::var(RULES_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => load_rules(path.trim()).await?,
        _ => {
            debug!("No rules file configured, using default compliance rules");
            ComplianceRules::default()
        }
    };

    EnvOverrides::from_env()?.apply(base)
}

/// Apply `GUARDRAIL_*` overrides read through `lookup` on top of `rules`.
///
/// # Errors
/// Returns an error if an override cannot be parsed or the result is invalid.
pub fn apply_env_overrides<F>(rules: ComplianceRules, lookup: F) -> ConfigResult<ComplianceRules>
where
    F: Fn(&str) -> Option<String>,
{
    EnvOverrides::from_lookup(lookup)?.apply(rules)
}

/// Values taken from `GUARDRAIL_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// `GUARDRAIL_BLOCKED_TERMS`, comma separated
    pub blocked_terms: Option<Vec<String>>,
    /// `GUARDRAIL_ALLOWED_DOMAINS`, comma separated
    pub allowed_domains: Option<Vec<String>>,
    /// `GUARDRAIL_MAX_RESPONSE_LENGTH`
    pub max_response_length: Option<usize>,
    /// `GUARDRAIL_REQUIRE_MODERATION`
    pub require_content_moderation: Option<bool>,
}

impl EnvOverrides {
    /// Read overrides from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidOverride`] for unparseable values.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary lookup function.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidOverride`] for unparseable values.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_response_length = lookup(MAX_RESPONSE_LENGTH_ENV)
            .map(|raw| {
                raw.trim()
                    .parse::<usize>()
                    .map_err(|e| ConfigError::InvalidOverride {
                        var: MAX_RESPONSE_LENGTH_ENV,
                        message: e.to_string(),
                    })
            })
            .transpose()?;

        let require_content_moderation = lookup(REQUIRE_MODERATION_ENV)
            .map(|raw| {
                parse_bool(&raw).ok_or_else(|| ConfigError::InvalidOverride {
                    var: REQUIRE_MODERATION_ENV,
                    message: format!("expected a boolean, got '{raw}'"),
                })
            })
            .transpose()?;

        Ok(Self {
            blocked_terms: lookup(BLOCKED_TERMS_ENV).map(|raw| split_list(&raw)),
            allowed_domains: lookup(ALLOWED_DOMAINS_ENV).map(|raw| split_list(&raw)),
            max_response_length,
            require_content_moderation,
        })
    }

    /// Whether no override is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the overrides on top of `rules` and re-validate.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if the result is invalid.
    pub fn apply(self, rules: ComplianceRules) -> ConfigResult<ComplianceRules> {
        if self.is_empty() {
            return Ok(rules);
        }

        debug!(overrides = ?self, "Applying environment overrides to compliance rules");

        ComplianceRules {
            blocked_terms: self.blocked_terms.unwrap_or(rules.blocked_terms),
            allowed_domains: self.allowed_domains.unwrap_or(rules.allowed_domains),
            max_response_length: self
                .max_response_length
                .unwrap_or(rules.max_response_length),
            require_content_moderation: self
                .require_content_moderation
                .unwrap_or(rules.require_content_moderation),
        }
        .into_validated()
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
