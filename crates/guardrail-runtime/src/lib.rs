//! # Guardrail Runtime
//!
//! Guarded turns and sessions around an external agent runtime.
//!
//! The agent runtime itself (agent definitions, tool loop, model calls) is
//! supplied by the caller through [`AgentRuntime`]; this crate applies the
//! guardrail gate before and after every run and keeps per-user session
//! state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod runner;
pub mod session;

pub use runner::{
    AgentRun, AgentRuntime, GuardedRunner, Rejection, RejectionStage, TurnOutcome, INPUT_APOLOGY,
    OUTPUT_APOLOGY, SYSTEM_APOLOGY,
};
pub use session::{GuardedSession, BLANK_PROMPT_MESSAGE};
