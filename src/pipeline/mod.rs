//! Pipeline orchestrator
//!
//! analyst → internal_researcher → researcher → director → done
//!
//! Stages run strictly one after another over a fresh `PipelineState`.
//! The Q&A side-channel (`answer`) bypasses the stages entirely.

use crate::config::{LlmProvider, Settings};
use crate::error::OrchestrationError;
use crate::gemini::GeminiClient;
use crate::models::FinancialMetrics;
use crate::openai::OpenAiClient;
use crate::prompts::CHAT_SYSTEM_PROMPT;
use crate::providers::{Retriever, TextGenerator, WebSearch};
use crate::retrieval::DocumentIndex;
use crate::state::{PipelineState, StatePatch};
use crate::tools::TavilySearch;
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

mod stage;
mod stages;

pub use stage::{Stage, StateField};
pub use stages::{NO_CONTENT_RETRIEVED, NO_NEWS_FOUND, RETRIEVAL_UNAVAILABLE};

pub struct Pipeline {
    generator: Arc<dyn TextGenerator>,
    retriever: Arc<dyn Retriever>,
    search: Arc<dyn WebSearch>,
}

impl Pipeline {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        retriever: Arc<dyn Retriever>,
        search: Arc<dyn WebSearch>,
    ) -> Self {
        Self {
            generator,
            retriever,
            search,
        }
    }

    /// Wire the configured generation provider, document index and web search.
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let generator: Arc<dyn TextGenerator> = match settings.llm_provider {
            LlmProvider::Gemini => Arc::new(GeminiClient::new(
                settings.llm_api_key.clone(),
                settings.llm_model.clone(),
                settings.llm_temperature,
            )?),
            LlmProvider::OpenAi => Arc::new(
                OpenAiClient::new(
                    settings.llm_api_key.clone(),
                    settings.llm_model.clone(),
                    settings.llm_temperature,
                )?
                .with_base_url(settings.openai_base_url.clone()),
            ),
        };

        let retriever = DocumentIndex::load(&settings.rag_index_path, settings.rag_top_k).await?;
        let search = TavilySearch::new(settings.tavily_api_key.clone(), settings.search_max_results)?;

        info!(
            generator = generator.name(),
            model = %settings.llm_model,
            index_chunks = retriever.len(),
            "Pipeline initialized"
        );

        Ok(Self::new(generator, Arc::new(retriever), Arc::new(search)))
    }

    /// Run every stage in order and return the completed state.
    ///
    /// A generation failure aborts the run; no partial state is returned.
    pub async fn run(
        &self,
        client_name: &str,
        sector: &str,
        metrics: FinancialMetrics,
        user_question: Option<String>,
    ) -> Result<PipelineState> {
        if client_name.trim().is_empty() {
            return Err(OrchestrationError::InvalidRequest(
                "client_name must not be empty".to_string(),
            ));
        }

        let run_started = Instant::now();
        let mut state = PipelineState::new(client_name.trim(), sector.trim(), metrics, user_question);

        info!(
            run_id = %state.run_id,
            client = %state.client_name,
            sector = %state.sector,
            fingerprint = %state.inputs_fingerprint(),
            "Pipeline: starting run"
        );

        let mut stage = Stage::FIRST;
        while !stage.is_terminal() {
            let stage_started = Instant::now();
            debug!(run_id = %state.run_id, %stage, "Stage started");

            let patch = self.execute(stage, &state).await.map_err(|e| {
                error!(run_id = %state.run_id, %stage, error = %e, "Stage failed, aborting run");
                e
            })?;
            state.apply(stage, patch)?;

            let elapsed_ms = stage_started.elapsed().as_millis() as u64;
            state.record_stage(stage, elapsed_ms);
            info!(run_id = %state.run_id, %stage, elapsed_ms, "Stage complete");

            stage = stage.next();
        }

        state.mark_completed();
        info!(
            run_id = %state.run_id,
            elapsed_ms = run_started.elapsed().as_millis() as u64,
            "Pipeline: run complete"
        );

        Ok(state)
    }

    async fn execute(&self, stage: Stage, state: &PipelineState) -> Result<StatePatch> {
        match stage {
            Stage::Analyst => self.analyst(state).await,
            Stage::InternalResearcher => self.internal_researcher(state).await,
            Stage::Researcher => self.researcher(state).await,
            Stage::Director => self.director(state).await,
            Stage::Done => Err(OrchestrationError::StateError(
                "the terminal stage cannot be executed".to_string(),
            )),
        }
    }

    /// Follow-up Q&A over a previously generated report.
    ///
    /// Issues one fresh retrieval for the question and one generation call.
    /// Holds no conversation state; the caller owns history.
    pub async fn answer(&self, question: &str, context_report: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(OrchestrationError::InvalidRequest(
                "question must not be empty".to_string(),
            ));
        }

        info!(question_chars = question.len(), "Answering follow-up question");

        let evidence = self.gather_evidence(question).await;
        let report = if context_report.trim().is_empty() {
            "(no report available)"
        } else {
            context_report
        };

        let user_message = format!(
            "REPORT CONTEXT:\n{}\n\nEVIDENCE:\n{}\n\nQUESTION:\n{}",
            report, evidence.text, question
        );

        self.generator.generate(CHAT_SYSTEM_PROMPT, &user_message).await
    }
}
