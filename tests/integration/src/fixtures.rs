//! Test fixtures and sample data for integration tests

use guardrail_core::{ConversationItem, UserContext, UserRole};
use serde_json::{json, Value};

/// Entry agent used by the travel assistant scenarios
pub const TRIAGE_AGENT: &str = "TriageAgent";

/// Super user aged 30
pub fn super_user() -> UserContext {
    UserContext::new("john doe", UserRole::SuperUser, 30).expect("valid user")
}

/// Admin aged 35
pub fn admin_user() -> UserContext {
    UserContext::new("amina khan", UserRole::Admin, 35).expect("valid user")
}

/// Basic user aged 22
pub fn basic_user() -> UserContext {
    UserContext::new("li wei", UserRole::Basic, 22).expect("valid user")
}

/// User below the handoff age, with the given role
pub fn minor(role: UserRole) -> UserContext {
    UserContext::new("sam", role, 16).expect("valid user")
}

/// Five-item history mixing roles and blocked terms
pub fn five_item_history() -> Vec<ConversationItem> {
    vec![
        ConversationItem::system("You are a travel assistant."),
        ConversationItem::user("I need a flight to Istanbul"),
        ConversationItem::assistant("Sure, which dates?"),
        ConversationItem::user("Next week. My PASSWORD for the site is abc"),
        ConversationItem::assistant("Never share a password or credit card number."),
    ]
}

/// Runtime-style JSON items
pub fn json_items(user_text: &str) -> Value {
    json!([
        {"role": "system", "content": "You are a travel assistant."},
        {"role": "user", "content": user_text}
    ])
}

/// Rules document in YAML
pub const RULES_YAML: &str = r"
blocked_terms:
  - passport number
  - password
allowed_domains:
  - example.com
max_response_length: 40
require_content_moderation: false
";

/// Rules document in JSON
pub const RULES_JSON: &str = r#"{
  "blocked_terms": ["iban"],
  "max_response_length": 64
}"#;
