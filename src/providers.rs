//! Provider traits consumed by the pipeline
//!
//! Every external collaborator sits behind one of these seams so the
//! pipeline can be driven by real HTTP adapters or by test doubles.

use crate::models::{FinancialMetrics, RetrievedPassage, SearchHit};
use crate::Result;
use async_trait::async_trait;

/// Stateless text generation (one system instruction, one user message).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Errors are fatal to a pipeline run.
    async fn generate(&self, system_instruction: &str, user_message: &str) -> Result<String>;
}

/// Read-only search over the pre-built internal document index.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Ordered by relevance; an empty list is a valid result.
    async fn search(&self, query: &str) -> Result<Vec<RetrievedPassage>>;
}

/// External news search.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// Revenue forecast for one client over a projection horizon.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn compute(&self, client_id: &str, horizon_months: u32) -> Result<FinancialMetrics>;

    /// Clients the provider has history for
    async fn list_clients(&self) -> Result<Vec<String>>;
}
