//! Domain types for ConceptNote
//!
//! Core domain types: Project (one per session), PreQuestion, CatalogueItem.
//! Project implements the Record trait for ProjectStore persistence.

mod catalogue;
mod id;
mod project;
mod question;

pub use catalogue::{CatalogueError, CatalogueItem, CatalogueProvider, StaticCatalogue, YamlCatalogue};
pub use id::generate_session_id;
pub use project::{MAX_CLARIFICATIONS, Project, QaPair, Stage};
pub use question::{FieldType, Importance, PreQuestion, fallback_pre_questions, parse_pre_questions};

// Re-export projectstore types for convenience
pub use projectstore::{IndexValue, Record, Store, StoreError, now_ms};
