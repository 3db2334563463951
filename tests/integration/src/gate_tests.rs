//! Input and output validation through the public gate

use crate::fixtures::*;
use crate::helpers::*;
use guardrail_config::ComplianceRules;
use guardrail_core::ConversationItem;
use guardrail_gate::ValidationCode;
use pretty_assertions::assert_eq;

#[test]
fn test_clean_input_passes_unchanged() {
    init_tracing();
    let gate = default_gate();
    let items = vec![
        ConversationItem::system("You are a travel assistant."),
        ConversationItem::user("What's the weather in Tokyo?"),
    ];

    let sanitized = assert_passed(gate.validate_input(&items));
    assert_eq!(sanitized, items);
}

#[test]
fn test_blocked_term_in_input_names_the_term() {
    init_tracing();
    let gate = default_gate();
    let result = gate.validate_input(&[ConversationItem::user("What is my Credit Card limit?")]);

    assert_failed(&result, "Input contains prohibited term: credit card");
    assert_eq!(result.code(), ValidationCode::BlockedTerm);
}

#[test]
fn test_blocked_term_outside_user_items_is_ignored() {
    let gate = default_gate();
    let items = vec![
        ConversationItem::assistant("Never share your password."),
        ConversationItem::user("Understood, thanks"),
    ];

    let sanitized = assert_passed(gate.validate_input(&items));
    assert_eq!(sanitized[0].content, "Never share your password.");
}

#[test]
fn test_injection_chars_stripped_and_length_capped() {
    let gate = default_gate();
    let long = format!("<b>{}</b>", "y".repeat(700));
    let items = vec![
        ConversationItem::user("Book {hotel} in [Paris] | `now`"),
        ConversationItem::user(long.as_str()),
    ];

    let sanitized = assert_passed(gate.validate_input(&items));
    assert_eq!(sanitized[0].content, "Book hotel in Paris  now");
    assert_eq!(sanitized[1].content.chars().count(), 500);
    assert_eq!(sanitized[1].content, format!("b{}", "y".repeat(499)));
}

#[test]
fn test_input_without_content_is_empty() {
    let gate = default_gate();
    let result = gate.validate_input(&[
        ConversationItem::system(""),
        ConversationItem::user(""),
    ]);
    assert_failed(&result, "Input cannot be empty");
    assert_eq!(result.code(), ValidationCode::Empty);
}

#[test]
fn test_json_input() {
    let gate = default_gate();

    let sanitized = assert_passed(gate.validate_input_value(&json_items("Flights to <Lima>")));
    assert_eq!(sanitized[1].content, "Flights to Lima");

    let blocked = gate.validate_input_value(&json_items("my social security number"));
    assert_failed(&blocked, "Input contains prohibited term: social security");

    let malformed = gate.validate_input_value(&serde_json::json!({"role": "user"}));
    assert_failed(&malformed, "Input validation error");
    assert_eq!(malformed.code(), ValidationCode::Malformed);
}

#[test]
fn test_output_checks() {
    init_tracing();
    let gate = default_gate();

    let clean = gate.validate_output("Sunny, 24 degrees.");
    assert_eq!(clean.code(), ValidationCode::Passed);
    assert_eq!(clean.message(), "Output validation passed");
    assert_eq!(assert_passed(clean), "Sunny, 24 degrees.");

    assert_failed(&gate.validate_output("  \n "), "Output cannot be empty");
    assert_failed(
        &gate.validate_output("Enter your password here"),
        "Output contains prohibited term: password",
    );

    let redacted = gate.validate_output("Card 4111111111111111 is on file");
    assert_eq!(redacted.code(), ValidationCode::Redacted);
    assert_eq!(redacted.message(), "PII redacted from output");
    assert_eq!(assert_passed(redacted), "Card [REDACTED] is on file");
}

#[test]
fn test_truncation_uses_configured_limit() {
    let rules = ComplianceRules::builder()
        .max_response_length(10)
        .build()
        .expect("rules");
    let gate = gate_with(rules);

    let result = gate.validate_output("ééééééééééééééé");
    assert_eq!(result.code(), ValidationCode::Truncated);
    assert_eq!(result.message(), "Output truncated due to length limit");
    assert_eq!(assert_passed(result), "éééééééééé...");

    let exact = gate.validate_output("0123456789");
    assert_eq!(exact.code(), ValidationCode::Passed);
}

#[test]
fn test_truncation_precedes_other_checks() {
    let rules = ComplianceRules::builder()
        .max_response_length(8)
        .build()
        .expect("rules");
    let gate = gate_with(rules);

    let truncated = assert_passed(gate.validate_output("Hello there, your password"));
    assert_eq!(truncated, "Hello th...");
}

#[test]
fn test_ssn_redacted_with_custom_terms() {
    let rules = ComplianceRules::builder()
        .blocked_terms(["iban"])
        .build()
        .expect("rules");
    let gate = gate_with(rules);

    let redacted = assert_passed(gate.validate_output("My SSN is 123-45-6789"));
    assert_eq!(redacted, "My SSN is [REDACTED]");

    let unmatched = gate.validate_output("Call 123-456-7890 or 12345678901234567");
    assert_eq!(unmatched.code(), ValidationCode::Passed);
}
