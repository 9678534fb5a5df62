//! ConceptNote - staged document generation pipeline
//!
//! Turns a short free-text project description into a client-ready
//! concept note through a fixed sequence of stages: pre-questions,
//! preview, bounded clarification, recommendation matching, final
//! document, export. Every generative call flows through one injected
//! gateway; every session mutation flows through the stage controller.
//!
//! # Modules
//!
//! - [`domain`] - Project record, stages, questions, catalogue
//! - [`llm`] - Generation gateway trait and provider clients
//! - [`gap`] - Clarification gap analysis
//! - [`recommend`] - Keyword-scored catalogue matching
//! - [`stage`] - The pipeline state machine
//! - [`render`] - Final document rendering
//! - [`ingest`] - Supporting document text extraction
//! - [`prompts`] - Handlebars prompt templates
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod gap;
pub mod ingest;
pub mod llm;
pub mod prompts;
pub mod recommend;
pub mod render;
pub mod stage;

// Re-export commonly used types
pub use config::{Config, LlmConfig, ResolvedLlmConfig};
pub use domain::{
    CatalogueItem, CatalogueProvider, MAX_CLARIFICATIONS, PreQuestion, Project, QaPair, Stage, StaticCatalogue, Store,
    YamlCatalogue, generate_session_id,
};
pub use gap::{CLIENT_QUESTION, Decision, GapAnalyzer, deterministic_decision};
pub use ingest::{ExtractError, PlainTextExtractor, TextExtractor, Transcriber};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, create_client};
pub use prompts::PromptLoader;
pub use recommend::{build_products_content, parse_keywords, score_items, select_items};
pub use render::{DocumentRenderer, PlainTextRenderer, RenderError};
pub use stage::{Clarification, InitiateOutcome, Recommendations, StageController, StageError};
