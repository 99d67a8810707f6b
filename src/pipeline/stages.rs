//! The four generation stages
//!
//! Each stage reads the state produced so far and returns a `StatePatch`.
//! Retrieval and search failures become placeholder evidence; generation
//! failures propagate.

use super::{Pipeline, StateField};
use crate::models::{RetrievedPassage, SearchHit};
use crate::prompts::{
    ANALYST_SYSTEM_PROMPT, DIRECTOR_SYSTEM_PROMPT, INTERNAL_RESEARCHER_SYSTEM_PROMPT,
    RESEARCHER_SYSTEM_PROMPT,
};
use crate::report;
use crate::state::{PipelineState, StatePatch};
use crate::Result;
use tracing::{debug, info, warn};

/// Evidence when the document index returned nothing.
pub const NO_CONTENT_RETRIEVED: &str = "no content retrieved";

/// Prefix of the evidence when the document index could not be reached.
pub const RETRIEVAL_UNAVAILABLE: &str = "retrieval unavailable";

pub const NO_NEWS_FOUND: &str = "No recent news found for this client or sector.";

/// Outcome of one retrieval call, already rendered as evidence text.
pub(crate) struct Evidence {
    pub text: String,
    pub unavailable: bool,
}

pub(crate) fn format_passages(passages: &[RetrievedPassage]) -> String {
    passages
        .iter()
        .map(|p| format!("[{}]: {}", p.source, p.content.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|h| format!("- {} (Source: {})", h.snippet.trim(), h.url))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Pipeline {
    /// One retrieval call with soft degradation.
    pub(crate) async fn gather_evidence(&self, query: &str) -> Evidence {
        match self.retriever.search(query).await {
            Ok(passages) if passages.is_empty() => {
                info!("Retrieval returned no passages");
                Evidence {
                    text: NO_CONTENT_RETRIEVED.to_string(),
                    unavailable: false,
                }
            }
            Ok(passages) => {
                debug!(passage_count = passages.len(), "Retrieval complete");
                Evidence {
                    text: format_passages(&passages),
                    unavailable: false,
                }
            }
            Err(e) => {
                warn!(error = %e, "Retrieval failed, continuing without internal evidence");
                Evidence {
                    text: format!("{}: {}", RETRIEVAL_UNAVAILABLE, e),
                    unavailable: true,
                }
            }
        }
    }

    pub(super) async fn analyst(&self, state: &PipelineState) -> Result<StatePatch> {
        let user_message = format!(
            "Financial metrics for {} ({}):\n{}",
            state.client_name,
            state.sector,
            state.financial_metrics.to_prompt_text()
        );

        let output = self
            .generator
            .generate(ANALYST_SYSTEM_PROMPT, &user_message)
            .await?;

        Ok(StatePatch::analyst(output))
    }

    pub(super) async fn internal_researcher(&self, state: &PipelineState) -> Result<StatePatch> {
        let query = match &state.user_question {
            Some(question) => format!(
                "{} (client: {}, sector: {})",
                question, state.client_name, state.sector
            ),
            None => format!(
                "{} {} engagements projects contracts account history",
                state.client_name, state.sector
            ),
        };

        let evidence = self.gather_evidence(&query).await;

        let user_message = format!(
            "CLIENT: {}\nSECTOR: {}\nQUESTION: {}\n\nEVIDENCE:\n{}",
            state.client_name,
            state.sector,
            state
                .user_question
                .as_deref()
                .unwrap_or("What do our internal documents say about this client?"),
            evidence.text
        );

        let generated = self
            .generator
            .generate(INTERNAL_RESEARCHER_SYSTEM_PROMPT, &user_message)
            .await?;

        let output = if evidence.unavailable {
            format!("> Caveat: {}\n\n{}", evidence.text, generated)
        } else {
            generated
        };

        Ok(StatePatch::internal_research(evidence.text, output))
    }

    pub(super) async fn researcher(&self, state: &PipelineState) -> Result<StatePatch> {
        let query = format!(
            "Latest business news and financial trends for {} in {} sector",
            state.client_name, state.sector
        );

        let raw = match self.search.search(&query).await {
            Ok(hits) if hits.is_empty() => NO_NEWS_FOUND.to_string(),
            Ok(hits) => {
                debug!(hit_count = hits.len(), "Web search complete");
                format_hits(&hits)
            }
            Err(e) => {
                warn!(error = %e, "Web search failed, continuing with placeholder");
                format!("No news found or search API error: {}", e)
            }
        };

        let user_message = format!(
            "CLIENT: {}\nSECTOR: {}\n\nRaw search results:\n{}",
            state.client_name, state.sector, raw
        );

        let generated = self
            .generator
            .generate(RESEARCHER_SYSTEM_PROMPT, &user_message)
            .await?;

        let output = if generated.trim().is_empty() { raw } else { generated };

        Ok(StatePatch::researcher(output))
    }

    pub(super) async fn director(&self, state: &PipelineState) -> Result<StatePatch> {
        let user_message = format!(
            "CLIENT: {}\nSECTOR: {}\n\n\
             QUANTITATIVE ANALYSIS (internal data):\n{}\n\n\
             INTERNAL RESEARCH (internal documents):\n{}\n\n\
             MARKET RESEARCH (external news):\n{}",
            state.client_name,
            state.sector,
            state.require(StateField::AnalystOutput)?,
            state.require(StateField::InternalResearchOutput)?,
            state.require(StateField::ResearcherOutput)?,
        );

        let memo = self
            .generator
            .generate(DIRECTOR_SYSTEM_PROMPT, &user_message)
            .await?;

        let missing = report::missing_sections(&memo);
        if !missing.is_empty() {
            warn!(?missing, "Director memo is missing sections");
        }

        let final_report = report::ensure_sections(&memo);

        match report::detect_strategy(&final_report) {
            Some(strategy) => info!(%strategy, "Director recommended strategy"),
            None => warn!("Director memo names no recognised strategy"),
        }

        Ok(StatePatch::director(final_report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_passages_tags_sources() {
        let text = format_passages(&[
            RetrievedPassage::new("Avionics renewal signed ", "contracts/leonardo.md"),
            RetrievedPassage::new("Helicopter staffing", "practice/aerospace.md"),
        ]);
        assert_eq!(
            text,
            "[contracts/leonardo.md]: Avionics renewal signed\n\n[practice/aerospace.md]: Helicopter staffing"
        );
    }

    #[test]
    fn test_format_hits_cites_urls() {
        let text = format_hits(&[SearchHit::new("Deal signed", "https://news.example/1")]);
        assert_eq!(text, "- Deal signed (Source: https://news.example/1)");
    }
}
