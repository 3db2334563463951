//! Rule loading from files and environment overrides

use crate::fixtures::*;
use crate::helpers::*;
use guardrail_config::{apply_env_overrides, load_rules, ComplianceRules, ConfigError};
use guardrail_gate::{GuardrailGate, ValidationCode};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::path::PathBuf;
use tempfile::TempDir;

async fn write_rules(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    tokio::fs::write(&path, content).await.expect("write rules");
    path
}

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[tokio::test]
async fn test_yaml_rules_drive_the_gate() {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_rules(&dir, "rules.yaml", RULES_YAML).await;

    let rules = load_rules(&path).await.expect("load");
    assert_eq!(rules.blocked_terms, vec!["passport number", "password"]);
    assert_eq!(rules.allowed_domains, vec!["example.com"]);
    assert!(!rules.require_content_moderation);

    let gate = GuardrailGate::new(rules).expect("gate");
    let blocked = gate.validate_output("Your Passport Number is X1");
    assert_eq!(blocked.code(), ValidationCode::BlockedTerm);

    let truncated = gate.validate_output(&"z".repeat(41));
    assert_eq!(truncated.code(), ValidationCode::Truncated);

    // "ssn" is no longer blocked
    assert!(gate.validate_output("ssn").passed());
}

#[tokio::test]
async fn test_json_rules_fill_missing_fields_with_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_rules(&dir, "rules.json", RULES_JSON).await;

    let rules = load_rules(&path).await.expect("load");
    let defaults = ComplianceRules::default();
    assert_eq!(rules.blocked_terms, vec!["iban"]);
    assert_eq!(rules.max_response_length, 64);
    assert_eq!(rules.allowed_domains, defaults.allowed_domains);
    assert!(rules.require_content_moderation);
}

#[tokio::test]
async fn test_unknown_option_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_rules(&dir, "rules.toml", "max_response_length = 10\nstrict = true\n").await;

    let err = load_rules(&path).await.expect_err("unknown key");
    assert!(matches!(err, ConfigError::Parse { format: "toml", .. }));
}

#[tokio::test]
async fn test_zero_length_limit_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_rules(&dir, "rules.yml", "max_response_length: 0\n").await;

    let err = load_rules(&path).await.expect_err("invalid");
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("max_response_length"));
}

#[tokio::test]
async fn test_missing_and_unsupported_files() {
    let dir = tempfile::tempdir().expect("tempdir");

    let missing = load_rules(dir.path().join("absent.yaml")).await;
    assert!(matches!(missing, Err(ConfigError::Io { .. })));

    let path = write_rules(&dir, "rules.ini", "x=1").await;
    let unsupported = load_rules(&path).await;
    assert!(matches!(unsupported, Err(ConfigError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_env_overrides_layer_on_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_rules(&dir, "rules.yaml", RULES_YAML).await;
    let base = load_rules(&path).await.expect("load");

    let rules = apply_env_overrides(
        base,
        lookup(&[
            ("GUARDRAIL_BLOCKED_TERMS", "pin, cvv ,"),
            ("GUARDRAIL_REQUIRE_MODERATION", "yes"),
        ]),
    )
    .expect("overrides");

    assert_eq!(rules.blocked_terms, vec!["pin", "cvv"]);
    assert_eq!(rules.max_response_length, 40);
    assert!(rules.require_content_moderation);
}

#[test]
fn test_invalid_override_rejected() {
    let err = apply_env_overrides(
        ComplianceRules::default(),
        lookup(&[("GUARDRAIL_MAX_RESPONSE_LENGTH", "lots")]),
    )
    .expect_err("invalid");
    assert!(matches!(err, ConfigError::InvalidOverride { .. }));

    let zero = apply_env_overrides(
        ComplianceRules::default(),
        lookup(&[("GUARDRAIL_MAX_RESPONSE_LENGTH", "0")]),
    );
    assert!(matches!(zero, Err(ConfigError::Invalid(_))));
}
