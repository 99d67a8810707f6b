//! Tavily web search adapter

use super::JsonApiClient;
use crate::error::OrchestrationError;
use crate::models::SearchHit;
use crate::providers::WebSearch;
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

const TAVILY_BASE_URL: &str = "https://api.tavily.com";
pub const DEFAULT_MAX_RESULTS: usize = 3;

pub struct TavilySearch {
    api: Option<JsonApiClient>,
    max_results: usize,
}

impl TavilySearch {
    /// Without an API key every search fails with a `SearchError`,
    /// which the researcher stage degrades on.
    pub fn new(api_key: Option<String>, max_results: usize) -> Result<Self> {
        Self::with_base_url(TAVILY_BASE_URL, api_key, max_results)
    }

    pub fn with_base_url(base_url: &str, api_key: Option<String>, max_results: usize) -> Result<Self> {
        let api = match api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => Some(JsonApiClient::new(base_url, Some(key))?),
            None => None,
        };

        Ok(Self { api, max_results })
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    content: String,
    #[serde(default)]
    url: String,
}

#[async_trait]
impl WebSearch for TavilySearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let api = self.api.as_ref().ok_or_else(|| {
            OrchestrationError::SearchError("TAVILY_API_KEY is not configured".to_string())
        })?;

        let body = api
            .post_json(
                "/search",
                &json!({
                    "query": query,
                    "max_results": self.max_results,
                    "search_depth": "basic",
                }),
            )
            .await
            .map_err(|e| {
                warn!("Tavily search failed: {}", e);
                OrchestrationError::SearchError(e)
            })?;

        let parsed: TavilyResponse = serde_json::from_value(body)?;
        let hits: Vec<SearchHit> = parsed
            .results
            .into_iter()
            .filter(|r| !r.content.trim().is_empty())
            .take(self.max_results)
            .map(|r| SearchHit::new(r.content, r.url))
            .collect();

        debug!(hit_count = hits.len(), "Tavily search complete");
        Ok(hits)
    }
}
