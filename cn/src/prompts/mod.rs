//! Prompt template management
//!
//! Templates are Handlebars `.pmt` files. Every template ships embedded
//! in the binary; a `prompts/` directory next to the working directory
//! or a `.conceptnote/prompts/` override directory takes precedence.

pub mod embedded;
mod loader;

use std::path::PathBuf;

use thiserror::Error;

pub use loader::PromptLoader;

/// Errors from loading or rendering prompt templates
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt template not found: {name}")]
    NotFound { name: String },

    #[error("Failed to read prompt file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to render template {name}: {source}")]
    Render {
        name: String,
        source: handlebars::RenderError,
    },
}
