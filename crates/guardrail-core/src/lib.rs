//! # Guardrail Core
//!
//! Core types and error handling for the agent guardrail gate.
//!
//! This crate provides the foundational types shared by every other crate:
//! - Conversation items exchanged with the agent runtime
//! - The validated caller identity (`UserContext`)
//! - Error types and handling
//! - Identifier newtypes

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod conversation;
pub mod error;
pub mod types;
pub mod user;

// Re-export commonly used types
pub use conversation::{ConversationItem, ItemRole};
pub use error::{GuardError, GuardResult};
pub use types::SessionId;
pub use user::{UserContext, UserRole};
