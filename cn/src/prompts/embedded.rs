//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Detailed preview generation prompt
pub const PREVIEW: &str = include_str!("../../prompts/preview.pmt");

/// Pre-stage structured question list prompt
pub const PRE_QUESTIONS: &str = include_str!("../../prompts/pre-questions.pmt");

/// Clarification fallback prompt (deterministic checks exhausted)
pub const CLARIFY: &str = include_str!("../../prompts/clarify.pmt");

/// Catalogue keyword extraction prompt
pub const KEYWORDS: &str = include_str!("../../prompts/keywords.pmt");

/// Internal capability matching prompt
pub const INTERNAL_MATCH: &str = include_str!("../../prompts/internal-match.pmt");

/// External technology suggestion prompt
pub const EXTERNAL_MATCH: &str = include_str!("../../prompts/external-match.pmt");

/// Client name resolution prompt
pub const CLIENT_NAME: &str = include_str!("../../prompts/client-name.pmt");

/// Final concept note prompt
pub const CONCEPT_NOTE: &str = include_str!("../../prompts/concept-note.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "preview" => Some(PREVIEW),
        "pre-questions" => Some(PRE_QUESTIONS),
        "clarify" => Some(CLARIFY),
        "keywords" => Some(KEYWORDS),
        "internal-match" => Some(INTERNAL_MATCH),
        "external-match" => Some(EXTERNAL_MATCH),
        "client-name" => Some(CLIENT_NAME),
        "concept-note" => Some(CONCEPT_NOTE),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
