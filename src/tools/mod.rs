//! HTTP-backed external tools
//!
//! Web news search and the revenue forecast service. Both are external
//! collaborators reached over JSON HTTP APIs.

use crate::Result;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub mod forecast;
pub mod search;

pub use forecast::HttpForecastProvider;
pub use search::TavilySearch;

/// Thin JSON client shared by the HTTP tools.
#[derive(Clone)]
pub(crate) struct JsonApiClient {
    client: Client,
    base_url: String,
    bearer: Option<String>,
}

impl JsonApiClient {
    pub(crate) fn new(base_url: &str, bearer: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer,
        })
    }

    pub(crate) async fn post_json(&self, path: &str, body: &Value) -> std::result::Result<Value, String> {
        let request = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body);
        self.send(path, request).await
    }

    pub(crate) async fn get_json(&self, path: &str) -> std::result::Result<Value, String> {
        let request = self.client.get(format!("{}{}", self.base_url, path));
        self.send(path, request).await
    }

    async fn send(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<Value, String> {
        let request = match &self.bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| format!("request failed for {}: {}", path, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("{} returned {}: {}", path, status, body.trim()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| format!("invalid JSON response from {}: {}", path, e))
    }
}

/// Unwrap the `data` envelope some services wrap their payload in.
pub(crate) fn payload(body: &Value) -> &Value {
    body.get("data").unwrap_or(body)
}
