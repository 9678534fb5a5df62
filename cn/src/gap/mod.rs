//! Clarification gap analysis
//!
//! Decides whether another clarification question is needed and which
//! one. Deterministic keyword checks handle the common cases; a single
//! generative call covers the residual ambiguous case.

mod analyzer;

use thiserror::Error;

pub use analyzer::{CLIENT_QUESTION, Decision, GapAnalyzer, NO_MORE_QUESTIONS, deterministic_decision};

use crate::llm::LlmError;
use crate::prompts::PromptError;

/// Errors from the generative fallback path
#[derive(Debug, Error)]
pub enum GapError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Prompt(#[from] PromptError),
}
