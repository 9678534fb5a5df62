//! Project domain type
//!
//! One Project record per session, tracking the raw client input, every
//! artifact produced along the pipeline, and the clarification
//! conversation. Mutated exclusively by the stage controller.

use std::collections::HashMap;

use projectstore::{IndexValue, Record, now_ms};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::id::generate_session_id;
use super::question::PreQuestion;

/// Hard cap on post-preview clarification questions per session
pub const MAX_CLARIFICATIONS: usize = 4;

/// Position in the pipeline state machine
///
/// Stages only ever advance. Restarting a session means creating a new
/// session id; there is no backward transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Raw input captured, nothing generated yet
    #[default]
    Initiated,
    /// Pre-preview question list generated, answers may still be pending
    PreClarifying,
    /// Formatted preview generated
    Previewed,
    /// Post-preview clarification loop in progress
    PostClarifying,
    /// Internal/external recommendations generated and cached
    Recommended,
    /// Final document generated
    Finalized,
    /// Final document rendered to a binary artifact at least once
    Exported,
}

impl Stage {
    /// Display name for logs and the CLI
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initiated => "initiated",
            Self::PreClarifying => "pre_clarifying",
            Self::Previewed => "previewed",
            Self::PostClarifying => "post_clarifying",
            Self::Recommended => "recommended",
            Self::Finalized => "finalized",
            Self::Exported => "exported",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One asked-and-answered clarification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// One concept-note session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Opaque session id, primary lookup key
    pub id: String,

    /// Original free-text description; immutable once set
    pub raw_input: String,

    /// Free text to emphasize during generation; immutable once set
    #[serde(default)]
    pub highlight_points: String,

    /// Concatenated text of uploaded documents, append-only
    #[serde(default)]
    pub supporting_text: String,

    /// Current pipeline stage, monotonically advancing
    pub stage: Stage,

    /// Formatted elaboration of the raw input
    #[serde(default)]
    pub preview: String,

    /// Ordered post-preview question/answer pairs, append-only, max 4
    #[serde(default)]
    pub conversation_history: Vec<QaPair>,

    /// Question surfaced to the caller but not yet answered
    #[serde(default)]
    pub pending_question: Option<String>,

    /// Structured questions asked before the preview stage
    #[serde(default)]
    pub pre_stage_questions: Vec<PreQuestion>,

    /// Answers to the pre-stage questions, parallel to the question list
    #[serde(default)]
    pub pre_stage_answers: Vec<String>,

    /// Cached internal-capability match artifact; write-once per session
    #[serde(default)]
    pub internal_recommendation: String,

    /// Cached external-technology suggestion artifact; write-once per session
    #[serde(default)]
    pub external_recommendation: String,

    /// Resolved client display name for the final document
    #[serde(default)]
    pub client_name: Option<String>,

    /// Output of the final stage; overwritten on each re-run of finalize
    #[serde(default)]
    pub final_document: String,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Project {
    /// Create a new Project with a generated session id
    pub fn new(
        raw_input: impl Into<String>,
        highlight_points: impl Into<String>,
        supporting_text: impl Into<String>,
    ) -> Self {
        let raw_input = raw_input.into();
        debug!(raw_input_len = raw_input.len(), "Project::new: called");
        let now = now_ms();

        Self {
            id: generate_session_id(),
            raw_input,
            highlight_points: highlight_points.into(),
            supporting_text: supporting_text.into(),
            stage: Stage::Initiated,
            preview: String::new(),
            conversation_history: Vec::new(),
            pending_question: None,
            pre_stage_questions: Vec::new(),
            pre_stage_answers: Vec::new(),
            internal_recommendation: String::new(),
            external_recommendation: String::new(),
            client_name: None,
            final_document: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create with a specific id (for testing)
    pub fn with_id(id: impl Into<String>, raw_input: impl Into<String>) -> Self {
        let id = id.into();
        debug!(%id, "Project::with_id: called");
        let mut project = Self::new(raw_input, "", "");
        project.id = id;
        project
    }

    /// Advance the stage; backward transitions are ignored
    ///
    /// Returns true if the stage moved forward.
    pub fn advance_stage(&mut self, stage: Stage) -> bool {
        debug!(%self.id, current = %self.stage, target = %stage, "Project::advance_stage: called");
        if stage > self.stage {
            self.stage = stage;
            self.updated_at = now_ms();
            true
        } else {
            debug!("Project::advance_stage: not a forward transition, ignoring");
            false
        }
    }

    /// Append uploaded document text
    pub fn append_supporting_text(&mut self, text: &str) {
        debug!(%self.id, text_len = text.len(), "Project::append_supporting_text: called");
        if !self.supporting_text.is_empty() {
            self.supporting_text.push('\n');
        }
        self.supporting_text.push_str(text);
        self.updated_at = now_ms();
    }

    /// Store the generated pre-stage question list
    pub fn set_pre_questions(&mut self, questions: Vec<PreQuestion>) {
        debug!(%self.id, count = questions.len(), "Project::set_pre_questions: called");
        self.pre_stage_questions = questions;
        self.updated_at = now_ms();
    }

    /// Store the caller's answers to the pre-stage questions
    pub fn set_pre_answers(&mut self, answers: Vec<String>) {
        debug!(%self.id, count = answers.len(), "Project::set_pre_answers: called");
        self.pre_stage_answers = answers;
        self.updated_at = now_ms();
    }

    /// Store the generated preview
    pub fn set_preview(&mut self, preview: impl Into<String>) {
        let preview = preview.into();
        debug!(%self.id, preview_len = preview.len(), "Project::set_preview: called");
        self.preview = preview;
        self.updated_at = now_ms();
    }

    /// Surface a clarification question to the caller without recording it
    pub fn set_pending_question(&mut self, question: impl Into<String>) {
        let question = question.into();
        debug!(%self.id, %question, "Project::set_pending_question: called");
        self.pending_question = Some(question);
        self.updated_at = now_ms();
    }

    /// Record an answer to the pending question
    ///
    /// Appends to the conversation history and clears the pending slot.
    /// Returns false when there is no pending question or the
    /// clarification budget is already spent; the history is never
    /// allowed past MAX_CLARIFICATIONS entries.
    pub fn record_clarification(&mut self, answer: impl Into<String>) -> bool {
        let answer = answer.into();
        debug!(%self.id, history_len = self.conversation_history.len(), "Project::record_clarification: called");

        if self.conversation_history.len() >= MAX_CLARIFICATIONS {
            debug!("Project::record_clarification: budget spent, refusing");
            return false;
        }
        let Some(question) = self.pending_question.take() else {
            debug!("Project::record_clarification: no pending question");
            return false;
        };

        self.conversation_history.push(QaPair { question, answer });
        self.updated_at = now_ms();
        true
    }

    /// Number of clarifications asked and answered so far
    pub fn clarification_count(&self) -> usize {
        self.conversation_history.len()
    }

    /// Render the post-preview conversation as a `Q:`/`A:` transcript
    pub fn qa_transcript(&self) -> String {
        debug!(%self.id, "Project::qa_transcript: called");
        self.conversation_history
            .iter()
            .map(|qa| format!("Q: {}\nA: {}", qa.question, qa.answer))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render the pre-stage questions and answers as a transcript
    ///
    /// Questions without a recorded answer are skipped.
    pub fn pre_qa_transcript(&self) -> String {
        debug!(%self.id, "Project::pre_qa_transcript: called");
        self.pre_stage_questions
            .iter()
            .zip(self.pre_stage_answers.iter())
            .filter(|(_, a)| !a.trim().is_empty())
            .map(|(q, a)| format!("Q: {}\nA: {}", q.question, a))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Cache the matching artifacts; once set they are never recomputed
    pub fn set_recommendations(&mut self, internal: impl Into<String>, external: impl Into<String>) {
        debug!(%self.id, "Project::set_recommendations: called");
        self.internal_recommendation = internal.into();
        self.external_recommendation = external.into();
        self.updated_at = now_ms();
    }

    /// Whether the matching artifacts are already cached
    pub fn has_recommendations(&self) -> bool {
        !self.internal_recommendation.is_empty()
    }

    /// Store the resolved client name
    pub fn set_client_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        debug!(%self.id, %name, "Project::set_client_name: called");
        self.client_name = Some(name);
        self.updated_at = now_ms();
    }

    /// Store the final document
    pub fn set_final_document(&mut self, document: impl Into<String>) {
        let document = document.into();
        debug!(%self.id, document_len = document.len(), "Project::set_final_document: called");
        self.final_document = document;
        self.updated_at = now_ms();
    }
}

impl Record for Project {
    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn collection_name() -> &'static str {
        "projects"
    }

    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        let mut fields = HashMap::new();
        fields.insert("stage".to_string(), IndexValue::String(self.stage.to_string()));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_new() {
        let project = Project::new("Build an ERP", "mobile first", "");
        assert!(project.id.starts_with("proj-"));
        assert_eq!(project.stage, Stage::Initiated);
        assert_eq!(project.raw_input, "Build an ERP");
        assert_eq!(project.highlight_points, "mobile first");
        assert!(project.conversation_history.is_empty());
        assert!(project.client_name.is_none());
    }

    #[test]
    fn test_stage_ordering() {
        assert!(Stage::Initiated < Stage::PreClarifying);
        assert!(Stage::PreClarifying < Stage::Previewed);
        assert!(Stage::Previewed < Stage::PostClarifying);
        assert!(Stage::PostClarifying < Stage::Recommended);
        assert!(Stage::Recommended < Stage::Finalized);
        assert!(Stage::Finalized < Stage::Exported);
    }

    #[test]
    fn test_advance_stage_forward_only() {
        let mut project = Project::with_id("proj-test", "input");
        assert!(project.advance_stage(Stage::PreClarifying));
        assert!(project.advance_stage(Stage::Previewed));

        // No regression, no self-transition
        assert!(!project.advance_stage(Stage::PreClarifying));
        assert!(!project.advance_stage(Stage::Previewed));
        assert_eq!(project.stage, Stage::Previewed);
    }

    #[test]
    fn test_record_clarification_requires_pending() {
        let mut project = Project::with_id("proj-test", "input");
        assert!(!project.record_clarification("an answer"));

        project.set_pending_question("What is your budget range for this project?");
        assert!(project.record_clarification("about 50k"));
        assert!(project.pending_question.is_none());
        assert_eq!(project.clarification_count(), 1);
    }

    #[test]
    fn test_clarification_budget_enforced() {
        let mut project = Project::with_id("proj-test", "input");
        for i in 0..MAX_CLARIFICATIONS {
            project.set_pending_question(format!("question {}", i));
            assert!(project.record_clarification(format!("answer {}", i)));
        }

        project.set_pending_question("one too many");
        assert!(!project.record_clarification("nope"));
        assert_eq!(project.clarification_count(), MAX_CLARIFICATIONS);
    }

    #[test]
    fn test_qa_transcript() {
        let mut project = Project::with_id("proj-test", "input");
        project.set_pending_question("What is your budget range for this project?");
        project.record_clarification("about 50k");

        let transcript = project.qa_transcript();
        assert!(transcript.contains("Q: What is your budget range for this project?"));
        assert!(transcript.contains("A: about 50k"));
    }

    #[test]
    fn test_pre_qa_transcript_skips_blank_answers() {
        use crate::domain::question::fallback_pre_questions;

        let mut project = Project::with_id("proj-test", "input");
        project.set_pre_questions(fallback_pre_questions());
        project.set_pre_answers(vec!["City Clinic".to_string(), "".to_string()]);

        let transcript = project.pre_qa_transcript();
        assert!(transcript.contains("A: City Clinic"));
        assert_eq!(transcript.matches("Q:").count(), 1);
    }

    #[test]
    fn test_append_supporting_text() {
        let mut project = Project::with_id("proj-test", "input");
        project.append_supporting_text("first doc");
        project.append_supporting_text("second doc");
        assert_eq!(project.supporting_text, "first doc\nsecond doc");
    }

    #[test]
    fn test_recommendation_cache_flag() {
        let mut project = Project::with_id("proj-test", "input");
        assert!(!project.has_recommendations());
        project.set_recommendations("internal picks", "external picks");
        assert!(project.has_recommendations());
    }
}
