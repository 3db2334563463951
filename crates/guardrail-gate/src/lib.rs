//! # Guardrail Gate
//!
//! Content and access guardrails applied around an agent runtime.
//!
//! ## Features
//!
//! - **Input validation**: blocked terms, injection-character stripping,
//!   length capping of user items
//! - **Output validation**: length truncation, blocked terms, PII redaction
//! - **Handoff permission**: role- and age-based access to downstream agents
//! - **Handoff filtering**: history windowing and term masking
//!
//! ## Example
//!
//! ```rust
//! use guardrail_core::ConversationItem;
//! use guardrail_gate::GuardrailGate;
//!
//! let gate = GuardrailGate::with_defaults().expect("default rules");
//!
//! let input = gate.validate_input(&[ConversationItem::user("Weather in {Oslo}?")]);
//! assert!(input.passed());
//!
//! let output = gate.validate_output("Your password is hunter2");
//! assert!(!output.passed());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod gate;
pub mod handoff;
pub mod pii;
pub mod result;
pub mod sanitize;
pub mod terms;

pub use gate::GuardrailGate;
pub use handoff::{
    evaluate_handoff_permission, ComplianceHandoffFilter, FilterChain, HandoffFilter,
    HandoffGuard, HandoffInputData, HandoffPolicy, RoleBasedHandoffPolicy, ToolItemFilter,
};
pub use pii::{PiiAnalysis, PiiPattern, PiiRedactor};
pub use result::{ValidationCode, ValidationResult};
pub use terms::BlockedTerms;
