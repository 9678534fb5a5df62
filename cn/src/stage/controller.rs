//! Stage Controller
//!
//! Owns every mutation of a Project. Each operation loads the record,
//! does its generative work on a local copy, and persists only after
//! everything succeeded, so a failed call never commits partial state.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use super::StageError;
use crate::domain::{CatalogueProvider, PreQuestion, Project, Stage, Store, fallback_pre_questions, parse_pre_questions};
use crate::gap::{Decision, GapAnalyzer, deterministic_decision};
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompts::PromptLoader;
use crate::recommend::{build_products_content, parse_keywords, score_items, select_items};
use crate::render::DocumentRenderer;

const PRE_QUESTIONS_SYSTEM_PROMPT: &str =
    "You are a business analyst preparing to draft a project concept note. \
     Produce the requested JSON exactly; no prose around it.";

const PREVIEW_SYSTEM_PROMPT: &str =
    "You are a business analyst writing a structured project elaboration for internal review. \
     Plain text only; no markdown.";

const KEYWORDS_SYSTEM_PROMPT: &str =
    "You extract search keywords from project descriptions. \
     Reply with a comma-separated list only.";

const INTERNAL_MATCH_SYSTEM_PROMPT: &str =
    "You are a solutions consultant matching a project against your organization's \
     existing products and modules.";

const EXTERNAL_MATCH_SYSTEM_PROMPT: &str =
    "You are a solutions consultant recommending third-party technologies and \
     platforms for a project.";

const CLIENT_NAME_SYSTEM_PROMPT: &str =
    "You extract the client or organization name a project is for. \
     Reply with the name only, nothing else.";

const CONCEPT_NOTE_SYSTEM_PROMPT: &str =
    "You are a senior business analyst writing a client-ready concept note. \
     Follow the requested structure exactly; plain text only.";

/// Result of starting a session
#[derive(Debug, Clone)]
pub struct InitiateOutcome {
    pub session_id: String,
    pub questions: Vec<PreQuestion>,
}

/// Result of one clarification round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clarification {
    /// Surface this question to the caller
    Question(String),
    /// Enough information has been gathered
    Done,
}

/// The two cached matching artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendations {
    pub internal: String,
    pub external: String,
}

/// Drives a session through the pipeline, one stage per call
pub struct StageController {
    store: Arc<Store>,
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
    catalogue: Arc<dyn CatalogueProvider>,
    renderer: Arc<dyn DocumentRenderer>,
    gap: GapAnalyzer,
    supporting_text_limit: usize,
}

impl StageController {
    pub fn new(
        store: Arc<Store>,
        llm: Arc<dyn LlmClient>,
        prompts: Arc<PromptLoader>,
        catalogue: Arc<dyn CatalogueProvider>,
        renderer: Arc<dyn DocumentRenderer>,
        supporting_text_limit: usize,
    ) -> Self {
        let gap = GapAnalyzer::new(llm.clone(), prompts.clone());
        Self {
            store,
            llm,
            prompts,
            catalogue,
            renderer,
            gap,
            supporting_text_limit,
        }
    }

    fn load(&self, session_id: &str) -> Result<Project, StageError> {
        Ok(self.store.get::<Project>(session_id)?)
    }

    /// Start a session: capture the raw input and generate the
    /// pre-stage question list
    ///
    /// Malformed question JSON falls back to a fixed two-question list;
    /// gateway failures propagate and nothing is persisted.
    pub async fn initiate(
        &self,
        raw_input: &str,
        highlight_points: &str,
        supporting_text: &str,
    ) -> Result<InitiateOutcome, StageError> {
        debug!(raw_input_len = raw_input.len(), "StageController::initiate: called");
        if raw_input.trim().is_empty() {
            return Err(StageError::Validation("raw_input must not be empty".to_string()));
        }

        let mut project = Project::new(raw_input, highlight_points, supporting_text);

        let prompt = self
            .prompts
            .render("pre-questions", &json!({ "raw_input": project.raw_input }))?;
        let response = self
            .llm
            .complete(CompletionRequest::new(PRE_QUESTIONS_SYSTEM_PROMPT, prompt).with_max_tokens(1024))
            .await?;

        let questions = match parse_pre_questions(&response.text) {
            Some(questions) => questions,
            None => {
                info!(session_id = %project.id, "initiate: malformed question payload, using fallback list");
                fallback_pre_questions()
            }
        };

        project.set_pre_questions(questions.clone());
        project.advance_stage(Stage::PreClarifying);
        self.store.put(&project)?;

        info!(session_id = %project.id, question_count = questions.len(), "initiate: session created");
        Ok(InitiateOutcome {
            session_id: project.id,
            questions,
        })
    }

    /// Record the caller's answers to the pre-stage questions
    pub fn answer_pre_questions(&self, session_id: &str, answers: Vec<String>) -> Result<Project, StageError> {
        debug!(%session_id, count = answers.len(), "StageController::answer_pre_questions: called");
        let mut project = self.load(session_id)?;

        if project.pre_stage_questions.is_empty() {
            return Err(StageError::Validation(
                "no pre-stage questions to answer".to_string(),
            ));
        }

        project.set_pre_answers(answers);
        self.store.put(&project)?;
        Ok(project)
    }

    /// Generate the formatted preview from everything gathered so far
    pub async fn generate_preview(&self, session_id: &str) -> Result<String, StageError> {
        debug!(%session_id, "StageController::generate_preview: called");
        let mut project = self.load(session_id)?;

        if project.raw_input.trim().is_empty() {
            return Err(StageError::Validation("raw_input must not be empty".to_string()));
        }

        let supporting: String = project
            .supporting_text
            .chars()
            .take(self.supporting_text_limit)
            .collect();

        let prompt = self.prompts.render(
            "preview",
            &json!({
                "raw_input": project.raw_input,
                "highlight_points": project.highlight_points,
                "pre_qa": project.pre_qa_transcript(),
                "supporting_text": supporting,
            }),
        )?;
        let response = self
            .llm
            .complete(CompletionRequest::new(PREVIEW_SYSTEM_PROMPT, prompt))
            .await?;

        let preview = response.text;
        project.set_preview(&preview);
        project.advance_stage(Stage::Previewed);
        self.store.put(&project)?;

        info!(%session_id, preview_len = preview.len(), "generate_preview: done");
        Ok(preview)
    }

    /// Ask the gap analyzer for the next clarification question
    ///
    /// A returned question is parked in the pending slot; the
    /// conversation history is only mutated once the caller answers.
    pub async fn next_clarification(&self, session_id: &str) -> Result<Clarification, StageError> {
        debug!(%session_id, "StageController::next_clarification: called");
        let mut project = self.load(session_id)?;

        if project.preview.is_empty() {
            return Err(StageError::Validation(
                "preview must be generated before clarification".to_string(),
            ));
        }

        match self.gap.next_question(&project).await? {
            Decision::Ask(question) => {
                project.set_pending_question(&question);
                project.advance_stage(Stage::PostClarifying);
                self.store.put(&project)?;
                info!(%session_id, "next_clarification: question surfaced");
                Ok(Clarification::Question(question))
            }
            Decision::Done => {
                debug!(%session_id, "next_clarification: done");
                Ok(Clarification::Done)
            }
            // The analyzer resolves its own fallback; this cannot occur
            Decision::NeedsFallback => {
                warn!(%session_id, "next_clarification: analyzer returned an unresolved fallback, treating as done");
                Ok(Clarification::Done)
            }
        }
    }

    /// Record the caller's answer to the pending clarification question
    pub fn answer_clarification(&self, session_id: &str, answer: &str) -> Result<Project, StageError> {
        debug!(%session_id, "StageController::answer_clarification: called");
        let mut project = self.load(session_id)?;

        if !project.record_clarification(answer) {
            return Err(StageError::Validation(
                "no pending question, or the clarification budget is spent".to_string(),
            ));
        }

        self.store.put(&project)?;
        Ok(project)
    }

    /// Produce (or return the cached) internal and external matches
    ///
    /// Once the artifacts are cached for a session, every later call
    /// returns them byte-identical with zero generative calls.
    pub async fn get_recommendations(&self, session_id: &str) -> Result<Recommendations, StageError> {
        debug!(%session_id, "StageController::get_recommendations: called");
        let mut project = self.load(session_id)?;

        if project.has_recommendations() {
            debug!(%session_id, "get_recommendations: cache hit");
            return Ok(Recommendations {
                internal: project.internal_recommendation,
                external: project.external_recommendation,
            });
        }

        if project.preview.is_empty() {
            return Err(StageError::Validation(
                "preview must be generated before recommendations".to_string(),
            ));
        }

        // Gap analysis must be settled (nothing left to ask, or budget
        // spent) before matching. The deterministic walk costs nothing.
        if let Decision::Ask(question) = deterministic_decision(&project) {
            debug!(%session_id, "get_recommendations: clarification still pending");
            return Err(StageError::Validation(format!(
                "clarification still pending before recommendations: {}",
                question
            )));
        }

        let transcript = project.qa_transcript();

        // One call to extract keywords, then score the catalogue locally
        let keywords_prompt = self.prompts.render(
            "keywords",
            &json!({ "preview": project.preview, "transcript": transcript }),
        )?;
        let keywords_response = self
            .llm
            .complete(CompletionRequest::new(KEYWORDS_SYSTEM_PROMPT, keywords_prompt).with_max_tokens(256))
            .await?;
        let keywords = parse_keywords(&keywords_response.text);
        debug!(%session_id, keyword_count = keywords.len(), "get_recommendations: keywords extracted");

        let items = self.catalogue.items()?;
        let selected = select_items(score_items(&items, &keywords));
        let products_content = build_products_content(&selected);

        let internal_prompt = self.prompts.render(
            "internal-match",
            &json!({
                "preview": project.preview,
                "transcript": transcript,
                "products_content": products_content,
            }),
        )?;
        let internal = self
            .llm
            .complete(CompletionRequest::new(INTERNAL_MATCH_SYSTEM_PROMPT, internal_prompt))
            .await?
            .text;

        let external_prompt = self.prompts.render(
            "external-match",
            &json!({ "preview": project.preview, "transcript": transcript }),
        )?;
        let external = self
            .llm
            .complete(CompletionRequest::new(EXTERNAL_MATCH_SYSTEM_PROMPT, external_prompt))
            .await?
            .text;

        project.set_recommendations(&internal, &external);
        project.advance_stage(Stage::Recommended);
        self.store.put(&project)?;

        info!(%session_id, "get_recommendations: artifacts cached");
        Ok(Recommendations { internal, external })
    }

    /// Resolve the client display name for the final document
    ///
    /// Priority: an explicit conversation or pre-stage answer whose
    /// question mentions the client, then the memoized resolution, then
    /// one generative extraction call.
    async fn resolve_client_name(&self, project: &Project) -> Result<String, StageError> {
        debug!(session_id = %project.id, "StageController::resolve_client_name: called");

        let mentions_client = |question: &str| {
            let q = question.to_lowercase();
            q.contains("client") || q.contains("organization") || q.contains("company")
        };

        for qa in &project.conversation_history {
            if mentions_client(&qa.question) && !qa.answer.trim().is_empty() {
                debug!("resolve_client_name: found in conversation");
                return Ok(qa.answer.trim().to_string());
            }
        }
        for (question, answer) in project.pre_stage_questions.iter().zip(project.pre_stage_answers.iter()) {
            if mentions_client(&question.question) && !answer.trim().is_empty() {
                debug!("resolve_client_name: found in pre-stage answers");
                return Ok(answer.trim().to_string());
            }
        }

        if let Some(ref name) = project.client_name {
            debug!("resolve_client_name: memoized");
            return Ok(name.clone());
        }

        let prompt = self.prompts.render(
            "client-name",
            &json!({
                "raw_input": project.raw_input,
                "preview": project.preview,
                "transcript": project.qa_transcript(),
            }),
        )?;
        let response = self
            .llm
            .complete(CompletionRequest::new(CLIENT_NAME_SYSTEM_PROMPT, prompt).with_max_tokens(64))
            .await?;

        let name = response.text.trim_matches('"').trim().to_string();
        debug!(%name, "resolve_client_name: extracted");
        Ok(name)
    }

    /// Assemble and generate the final document
    ///
    /// Callers may narrow the recommendations to their edited
    /// selections; omitted selections fall back to the cached artifacts.
    pub async fn finalize(
        &self,
        session_id: &str,
        selected_internal: Option<String>,
        selected_external: Option<String>,
    ) -> Result<String, StageError> {
        debug!(%session_id, "StageController::finalize: called");
        let mut project = self.load(session_id)?;

        if !project.has_recommendations() {
            return Err(StageError::Validation(
                "recommendations must be generated before finalizing".to_string(),
            ));
        }

        let client_name = self.resolve_client_name(&project).await?;
        let internal = selected_internal.unwrap_or_else(|| project.internal_recommendation.clone());
        let external = selected_external.unwrap_or_else(|| project.external_recommendation.clone());

        let prompt = self.prompts.render(
            "concept-note",
            &json!({
                "client_name": client_name,
                "preview": project.preview,
                "transcript": project.qa_transcript(),
                "highlight_points": project.highlight_points,
                "internal_recommendation": internal,
                "external_recommendation": external,
            }),
        )?;
        let response = self
            .llm
            .complete(CompletionRequest::new(CONCEPT_NOTE_SYSTEM_PROMPT, prompt))
            .await?;

        let document = response.text;
        project.set_client_name(&client_name);
        project.set_final_document(&document);
        project.advance_stage(Stage::Finalized);
        self.store.put(&project)?;

        info!(%session_id, %client_name, document_len = document.len(), "finalize: done");
        Ok(document)
    }

    /// Render the final document to a binary artifact
    ///
    /// Repeatable: exporting twice for an unchanged document returns
    /// byte-identical output. The first export advances the stage.
    pub fn export(&self, session_id: &str) -> Result<Vec<u8>, StageError> {
        debug!(%session_id, "StageController::export: called");
        let mut project = self.load(session_id)?;

        if project.final_document.is_empty() {
            return Err(StageError::Validation(
                "final document must be generated before export".to_string(),
            ));
        }

        let title = match project.client_name {
            Some(ref name) if !name.is_empty() => format!("Concept Note - {}", name),
            _ => "Concept Note".to_string(),
        };
        let artifact = self.renderer.render(&project.final_document, &title)?;

        if project.advance_stage(Stage::Exported) {
            self.store.put(&project)?;
        }

        info!(%session_id, artifact_len = artifact.len(), "export: done");
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MAX_CLARIFICATIONS, StaticCatalogue};
    use crate::llm::LlmError;
    use crate::llm::client::mock::MockLlmClient;
    use crate::render::PlainTextRenderer;
    use tempfile::TempDir;

    fn controller_with(llm: Arc<MockLlmClient>) -> (StageController, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(Store::open(temp.path().join("test.db")).unwrap());
        let catalogue = Arc::new(StaticCatalogue::new(vec![
            crate::domain::CatalogueItem {
                name: "Scheduling Suite".to_string(),
                description: "appointment scheduling for clinics".to_string(),
                doc_text: "Full scheduling docs".to_string(),
            },
            crate::domain::CatalogueItem {
                name: "Reporting Suite".to_string(),
                description: "dashboards and exports".to_string(),
                doc_text: String::new(),
            },
        ]));
        let controller = StageController::new(
            store,
            llm,
            Arc::new(PromptLoader::embedded_only()),
            catalogue,
            Arc::new(PlainTextRenderer::new()),
            4000,
        );
        (controller, temp)
    }

    fn pre_question_json() -> String {
        serde_json::json!([{
            "id": "q1",
            "category": "client",
            "question": "Who is the client or organization this project is for?",
            "field_type": "text",
            "importance": "critical",
            "skip_allowed": false
        }])
        .to_string()
    }

    #[tokio::test]
    async fn test_initiate_creates_session_with_questions() {
        let llm = Arc::new(MockLlmClient::with_texts(vec![pre_question_json()]));
        let (controller, _temp) = controller_with(llm);

        let outcome = controller
            .initiate("A patient scheduling app", "offline-first", "")
            .await
            .unwrap();

        assert!(outcome.session_id.starts_with("proj-"));
        assert_eq!(outcome.questions.len(), 1);
        assert_eq!(outcome.questions[0].id, "q1");
    }

    #[tokio::test]
    async fn test_initiate_rejects_empty_input() {
        let llm = Arc::new(MockLlmClient::new());
        let (controller, _temp) = controller_with(llm.clone());

        let result = controller.initiate("   ", "", "").await;
        assert!(matches!(result, Err(StageError::Validation(_))));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_initiate_malformed_json_uses_fallback() {
        let llm = Arc::new(MockLlmClient::with_texts(vec!["not json at all".to_string()]));
        let (controller, _temp) = controller_with(llm);

        let outcome = controller.initiate("A scheduling app", "", "").await.unwrap();
        assert_eq!(outcome.questions, fallback_pre_questions());
    }

    #[tokio::test]
    async fn test_transient_failure_persists_nothing() {
        let llm = Arc::new(MockLlmClient::with_responses(vec![Err(LlmError::RateLimited {
            retry_after: std::time::Duration::from_secs(30),
        })]));
        let (controller, _temp) = controller_with(llm);

        let result = controller.initiate("A scheduling app", "", "").await;
        match result {
            Err(StageError::TransientCapacity { .. }) => {}
            other => panic!("expected TransientCapacity, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_preview_and_clarification_flow() {
        let llm = Arc::new(MockLlmClient::with_texts(vec![
            pre_question_json(),
            "PROJECT OVERVIEW\nA scheduling app for City Clinic".to_string(),
        ]));
        let (controller, _temp) = controller_with(llm);

        let outcome = controller
            .initiate("A patient scheduling app for a hospital, budget 50k", "", "")
            .await
            .unwrap();
        let session_id = outcome.session_id;

        let preview = controller.generate_preview(&session_id).await.unwrap();
        assert!(preview.contains("City Clinic"));

        // "hospital" and "budget" are covered; timeline comes next,
        // deterministically, with no generative call.
        let clarification = controller.next_clarification(&session_id).await.unwrap();
        match clarification {
            Clarification::Question(q) => assert!(q.to_lowercase().contains("timeline")),
            Clarification::Done => panic!("expected a question"),
        }

        let project = controller.answer_clarification(&session_id, "3 months").unwrap();
        assert_eq!(project.clarification_count(), 1);
        assert_eq!(project.stage, Stage::PostClarifying);
    }

    #[tokio::test]
    async fn test_answer_without_pending_question_fails() {
        let llm = Arc::new(MockLlmClient::with_texts(vec![pre_question_json()]));
        let (controller, _temp) = controller_with(llm);

        let outcome = controller.initiate("An app for Acme Company", "", "").await.unwrap();
        let result = controller.answer_clarification(&outcome.session_id, "an answer");
        assert!(matches!(result, Err(StageError::Validation(_))));
    }

    #[tokio::test]
    async fn test_budget_exhaustion_returns_done() {
        let llm = Arc::new(MockLlmClient::with_texts(vec![
            pre_question_json(),
            "preview text".to_string(),
        ]));
        let (controller, _temp) = controller_with(llm.clone());

        let outcome = controller.initiate("Some vague idea", "", "").await.unwrap();
        let session_id = outcome.session_id;
        controller.generate_preview(&session_id).await.unwrap();

        for i in 0..MAX_CLARIFICATIONS {
            let clarification = controller.next_clarification(&session_id).await.unwrap();
            assert!(matches!(clarification, Clarification::Question(_)), "round {}", i);
            controller
                .answer_clarification(&session_id, &format!("answer {}", i))
                .unwrap();
        }

        let calls_before = llm.call_count();
        let clarification = controller.next_clarification(&session_id).await.unwrap();
        assert_eq!(clarification, Clarification::Done);
        assert_eq!(llm.call_count(), calls_before);
    }

    #[tokio::test]
    async fn test_recommendations_cached_after_first_call() {
        let llm = Arc::new(MockLlmClient::with_texts(vec![
            pre_question_json(),
            "preview of a clinic scheduling project".to_string(),
            "scheduling, clinic".to_string(),
            "Internal: use the Scheduling Suite".to_string(),
            "External: consider Twilio for SMS".to_string(),
        ]));
        let (controller, _temp) = controller_with(llm.clone());

        let outcome = controller
            .initiate(
                "Scheduling app for a hospital, budget 30k, 2 month deadline, \
                 300 users, integrates with their ERP",
                "",
                "",
            )
            .await
            .unwrap();
        let session_id = outcome.session_id;
        controller.generate_preview(&session_id).await.unwrap();

        let first = controller.get_recommendations(&session_id).await.unwrap();
        assert!(first.internal.contains("Scheduling Suite"));
        let calls_after_first = llm.call_count();

        let second = controller.get_recommendations(&session_id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(llm.call_count(), calls_after_first);
    }

    #[tokio::test]
    async fn test_recommendations_require_settled_clarification() {
        let llm = Arc::new(MockLlmClient::with_texts(vec![
            pre_question_json(),
            "preview text".to_string(),
        ]));
        let (controller, _temp) = controller_with(llm.clone());

        // Identity is satisfied but budget is never mentioned and the
        // budget is not exhausted, so the analyzer would still ask.
        let outcome = controller
            .initiate("Billing portal for Acme Company", "", "")
            .await
            .unwrap();
        let session_id = outcome.session_id;
        controller.generate_preview(&session_id).await.unwrap();
        assert!(matches!(
            deterministic_decision(&controller.load(&session_id).unwrap()),
            Decision::Ask(_)
        ));

        let calls_before = llm.call_count();
        let result = controller.get_recommendations(&session_id).await;
        assert!(matches!(result, Err(StageError::Validation(_))));
        // The gate is deterministic and free
        assert_eq!(llm.call_count(), calls_before);
    }

    #[tokio::test]
    async fn test_recommendations_require_preview() {
        let llm = Arc::new(MockLlmClient::with_texts(vec![pre_question_json()]));
        let (controller, _temp) = controller_with(llm);

        let outcome = controller.initiate("An idea", "", "").await.unwrap();
        let result = controller.get_recommendations(&outcome.session_id).await;
        assert!(matches!(result, Err(StageError::Validation(_))));
    }

    #[tokio::test]
    async fn test_finalize_resolves_client_name_from_conversation() {
        let llm = Arc::new(MockLlmClient::with_texts(vec![
            pre_question_json(),
            "preview text".to_string(),
            "keywords".to_string(),
            "internal matches".to_string(),
            "external matches".to_string(),
            "CONCEPT NOTE\nfinal document body".to_string(),
        ]));
        let (controller, _temp) = controller_with(llm);

        let outcome = controller
            .initiate(
                "An app idea, budget 5k, one month deadline, 20 users, no integration needed",
                "",
                "",
            )
            .await
            .unwrap();
        let session_id = outcome.session_id;
        controller.generate_preview(&session_id).await.unwrap();

        // The identity question goes out first for this vague input
        let clarification = controller.next_clarification(&session_id).await.unwrap();
        assert!(matches!(&clarification, Clarification::Question(q) if q.contains("client")));
        controller.answer_clarification(&session_id, "City Clinic").unwrap();

        controller.get_recommendations(&session_id).await.unwrap();
        let document = controller.finalize(&session_id, None, None).await.unwrap();
        assert!(document.contains("final document"));

        let project = controller.load(&session_id).unwrap();
        assert_eq!(project.client_name.as_deref(), Some("City Clinic"));
        assert_eq!(project.stage, Stage::Finalized);
    }

    #[tokio::test]
    async fn test_finalize_requires_recommendations() {
        let llm = Arc::new(MockLlmClient::with_texts(vec![pre_question_json()]));
        let (controller, _temp) = controller_with(llm);

        let outcome = controller.initiate("An idea for Acme Company", "", "").await.unwrap();
        let result = controller.finalize(&outcome.session_id, None, None).await;
        assert!(matches!(result, Err(StageError::Validation(_))));
    }

    #[tokio::test]
    async fn test_export_twice_is_byte_identical() {
        let llm = Arc::new(MockLlmClient::with_texts(vec![
            pre_question_json(),
            "preview text".to_string(),
            "keywords".to_string(),
            "internal matches".to_string(),
            "external matches".to_string(),
            "Acme Corp".to_string(),
            "FINAL DOCUMENT\nbody **text**".to_string(),
        ]));
        let (controller, _temp) = controller_with(llm);

        let outcome = controller
            .initiate(
                "A billing platform for a company, budget 10k, deadline 2 months, \
                 500 users, integrates with SAP",
                "",
                "",
            )
            .await
            .unwrap();
        let session_id = outcome.session_id;
        controller.generate_preview(&session_id).await.unwrap();
        controller.get_recommendations(&session_id).await.unwrap();
        controller.finalize(&session_id, None, None).await.unwrap();

        let first = controller.export(&session_id).unwrap();
        let second = controller.export(&session_id).unwrap();
        assert_eq!(first, second);

        let project = controller.load(&session_id).unwrap();
        assert_eq!(project.stage, Stage::Exported);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let llm = Arc::new(MockLlmClient::new());
        let (controller, _temp) = controller_with(llm);

        let result = controller.generate_preview("proj-nope").await;
        assert!(matches!(result, Err(StageError::NotFound { .. })));
    }
}
