//! Integration tests for the agent guardrail gate
//!
//! This crate provides integration tests covering:
//! - Input and output validation through the public gate
//! - Handoff permission and handoff history filtering
//! - Guarded sessions over a scripted agent runtime
//! - Rule loading from files and environment overrides

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items
pub use fixtures::*;
pub use helpers::*;
pub use mock_runtime::*;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod gate_tests;
#[cfg(test)]
mod handoff_tests;
