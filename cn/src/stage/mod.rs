//! Stage controller
//!
//! The state machine driving a session through the pipeline. Every
//! transition is one request-response cycle: read the project, run the
//! stage's generative work, write the result back, advance the stage.
//! A failed transition leaves the project exactly as it was.

mod controller;

use std::time::Duration;

use thiserror::Error;

pub use controller::{Clarification, InitiateOutcome, Recommendations, StageController};

use crate::domain::{CatalogueError, StoreError};
use crate::gap::GapError;
use crate::llm::LlmError;
use crate::prompts::PromptError;
use crate::render::RenderError;

/// Errors surfaced to the caller by stage transitions
#[derive(Debug, Error)]
pub enum StageError {
    /// Unknown session; the caller must start a new one
    #[error("Session not found: {session_id}")]
    NotFound { session_id: String },

    /// A required input is missing or a precondition is unmet
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The generation capability is rate-limited; retryable, no state mutated
    #[error("Generation capability at capacity, retry after {retry_after:?}")]
    TransientCapacity { retry_after: Duration },

    /// The generation capability returned an error payload
    #[error("Generation failed: {0}")]
    Generation(String),

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl StageError {
    /// Whether the caller should retry the same transition
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientCapacity { .. })
    }
}

impl From<LlmError> for StageError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::RateLimited { retry_after } => Self::TransientCapacity { retry_after },
            other => Self::Generation(other.to_string()),
        }
    }
}

impl From<GapError> for StageError {
    fn from(err: GapError) -> Self {
        match err {
            GapError::Llm(e) => e.into(),
            GapError::Prompt(e) => Self::Prompt(e),
        }
    }
}

impl From<StoreError> for StageError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => Self::NotFound { session_id: id },
            other => Self::Store(other),
        }
    }
}
