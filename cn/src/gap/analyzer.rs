//! Gap Analyzer
//!
//! Layered decision: cheap keyword checks first, one generative call
//! only when the deterministic walk cannot decide.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use super::GapError;
use crate::domain::{MAX_CLARIFICATIONS, Project};
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompts::PromptLoader;

/// Fixed question asked when no organization keyword is present
pub const CLIENT_QUESTION: &str = "What is the name of the client, organization, or company this project is for?";

/// Completion signal the generative fallback may return verbatim
pub const NO_MORE_QUESTIONS: &str = "NO_MORE_QUESTIONS";

/// Keywords that mark the client identity as already known
const IDENTITY_KEYWORDS: &[&str] = &[
    "client",
    "organization",
    "company",
    "school",
    "university",
    "hospital",
    "ngo",
    "startup",
    "institute",
    "college",
];

/// One topic bucket: satisfied when any keyword appears in the
/// accumulated text, already-asked when any keyword appears in a
/// previously asked question.
struct Bucket {
    name: &'static str,
    keywords: &'static [&'static str],
    question: &'static str,
}

/// Fixed priority order: budget, timeline, scale, integration
const BUCKETS: &[Bucket] = &[
    Bucket {
        name: "budget",
        keywords: &["budget", "cost", "price", "pricing", "funding", "investment"],
        question: "What is your budget range for this project?",
    },
    Bucket {
        name: "timeline",
        keywords: &["timeline", "deadline", "duration", "timeframe", "month", "week"],
        question: "What is the timeline or deadline for delivering this project?",
    },
    Bucket {
        name: "scale",
        keywords: &["scale", "users", "students", "transactions", "capacity", "concurrent"],
        question: "What scale do you expect initially (number of users or transactions)?",
    },
    Bucket {
        name: "integration",
        keywords: &["integration", "integrate", "existing system", "erp", "sso", "sync"],
        question: "What existing systems or APIs should this integrate with?",
    },
];

/// Outcome of a gap analysis round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Ask this question next
    Ask(String),
    /// Enough information has been gathered
    Done,
    /// The deterministic walk could not decide; needs one generative call
    NeedsFallback,
}

/// Everything the caller and the session have said so far, lower-cased
fn accumulated_text(project: &Project) -> String {
    let mut text = String::new();
    text.push_str(&project.raw_input);
    text.push('\n');
    text.push_str(&project.preview);
    for qa in &project.conversation_history {
        text.push('\n');
        text.push_str(&qa.question);
        text.push('\n');
        text.push_str(&qa.answer);
    }
    text.to_lowercase()
}

/// Every question already surfaced to the caller, lower-cased
fn asked_questions(project: &Project) -> Vec<String> {
    let mut asked: Vec<String> = project
        .conversation_history
        .iter()
        .map(|qa| qa.question.to_lowercase())
        .collect();
    if let Some(ref pending) = project.pending_question {
        asked.push(pending.to_lowercase());
    }
    asked
}

/// Deterministic part of the gap analysis
///
/// Walks the identity check and the four topic buckets without touching
/// the generation capability. Idempotent for identical project state.
pub fn deterministic_decision(project: &Project) -> Decision {
    debug!(%project.id, history_len = project.conversation_history.len(), "deterministic_decision: called");

    // Budget check always wins
    if project.clarification_count() >= MAX_CLARIFICATIONS {
        debug!("deterministic_decision: budget spent");
        return Decision::Done;
    }

    let text = accumulated_text(project);
    let asked = asked_questions(project);

    // Identity check takes priority over every bucket
    let identity_known = IDENTITY_KEYWORDS.iter().any(|kw| text.contains(kw));
    let identity_asked = asked.iter().any(|q| q.contains("client"));
    if !identity_known && !identity_asked {
        debug!("deterministic_decision: client identity unknown");
        return Decision::Ask(CLIENT_QUESTION.to_string());
    }

    let mut unsatisfied_exist = false;
    for bucket in BUCKETS {
        let satisfied = bucket.keywords.iter().any(|kw| text.contains(kw));
        if satisfied {
            continue;
        }
        unsatisfied_exist = true;

        let already_asked = asked
            .iter()
            .any(|q| bucket.keywords.iter().any(|kw| q.contains(kw)));
        if !already_asked {
            debug!(bucket = bucket.name, "deterministic_decision: unsatisfied bucket found");
            return Decision::Ask(bucket.question.to_string());
        }
    }

    if !unsatisfied_exist {
        debug!("deterministic_decision: all buckets satisfied");
        return Decision::Done;
    }

    // Every unsatisfied bucket has already been asked about
    debug!("deterministic_decision: residual ambiguity, needs fallback");
    Decision::NeedsFallback
}

/// Gap analyzer with a generative fallback for the residual case
pub struct GapAnalyzer {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
}

const CLARIFY_SYSTEM_PROMPT: &str =
    "You are a business analyst gathering requirements for a project concept note. \
     Ask at most one short, concrete question, or reply with the completion signal when \
     nothing important is missing.";

impl GapAnalyzer {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>) -> Self {
        Self { llm, prompts }
    }

    /// Decide the next question, or signal completion
    ///
    /// Runs the deterministic walk first; only the residual ambiguous
    /// case costs a generative call. The fallback's output is trusted
    /// verbatim.
    pub async fn next_question(&self, project: &Project) -> Result<Decision, GapError> {
        debug!(%project.id, "GapAnalyzer::next_question: called");
        match deterministic_decision(project) {
            Decision::NeedsFallback => {}
            decision => return Ok(decision),
        }

        let prompt = self.prompts.render(
            "clarify",
            &json!({
                "raw_input": project.raw_input,
                "preview": project.preview,
                "transcript": project.qa_transcript(),
                "questions_asked": project.clarification_count(),
                "questions_remaining": MAX_CLARIFICATIONS - project.clarification_count(),
            }),
        )?;

        let response = self
            .llm
            .complete(CompletionRequest::new(CLARIFY_SYSTEM_PROMPT, prompt).with_max_tokens(256))
            .await?;

        let text = response.text;
        if text.contains(NO_MORE_QUESTIONS) {
            debug!("GapAnalyzer::next_question: fallback signaled completion");
            return Ok(Decision::Done);
        }

        debug!("GapAnalyzer::next_question: fallback produced a question");
        Ok(Decision::Ask(text))
    }
}
