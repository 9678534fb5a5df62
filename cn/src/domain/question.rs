//! Pre-stage question schema
//!
//! The pre-preview question list comes back from the generation
//! capability as JSON. It is parsed into a typed struct here; any
//! payload that fails validation maps deterministically to the fixed
//! fallback list instead of raising.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Expected UI input type for a pre-stage question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Date,
    Select,
}

/// How much the answer matters for the preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Critical,
    Important,
    Optional,
}

/// One structured pre-stage question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreQuestion {
    pub id: String,
    pub category: String,
    pub question: String,
    pub field_type: FieldType,
    pub importance: Importance,
    pub skip_allowed: bool,
}

/// The fixed fallback used whenever the generated JSON is unusable
pub fn fallback_pre_questions() -> Vec<PreQuestion> {
    vec![
        PreQuestion {
            id: "fallback-1".to_string(),
            category: "identity".to_string(),
            question: "Who is the client or organization this project is for?".to_string(),
            field_type: FieldType::Text,
            importance: Importance::Critical,
            skip_allowed: false,
        },
        PreQuestion {
            id: "fallback-2".to_string(),
            category: "scope".to_string(),
            question: "What is the main outcome you want this project to achieve?".to_string(),
            field_type: FieldType::Textarea,
            importance: Importance::Important,
            skip_allowed: true,
        },
    ]
}

/// Parse a generated pre-question payload
///
/// Accepts the JSON array either bare or wrapped in a markdown code
/// fence. Returns None when the payload is malformed, empty, or
/// contains a blank question text; the caller substitutes the fallback
/// list. At most 5 questions are kept, extras are truncated; shorter
/// lists pass through as-is (a single well-formed question beats the
/// fixed fallback pair).
pub fn parse_pre_questions(raw: &str) -> Option<Vec<PreQuestion>> {
    debug!(raw_len = raw.len(), "parse_pre_questions: called");

    let json = strip_code_fence(raw);
    let parsed: Vec<PreQuestion> = match serde_json::from_str(json) {
        Ok(questions) => questions,
        Err(e) => {
            warn!(error = %e, "parse_pre_questions: payload did not parse, using fallback");
            return None;
        }
    };

    if parsed.is_empty() {
        warn!("parse_pre_questions: empty question list, using fallback");
        return None;
    }
    if parsed.iter().any(|q| q.question.trim().is_empty()) {
        warn!("parse_pre_questions: blank question text, using fallback");
        return None;
    }

    let mut questions = parsed;
    if questions.len() > 5 {
        debug!(count = questions.len(), "parse_pre_questions: truncating to 5");
        questions.truncate(5);
    }
    Some(questions)
}

/// Strip a surrounding ```/```json fence if present
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
