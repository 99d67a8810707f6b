//! Forecast service adapter
//!
//! The forecasting model runs out of process; this adapter only asks it for
//! the KPIs of one client.

use super::{payload, JsonApiClient};
use crate::error::OrchestrationError;
use crate::models::FinancialMetrics;
use crate::providers::ForecastProvider;
use crate::Result;
use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

pub const DEFAULT_HORIZON_MONTHS: u32 = 12;

pub struct HttpForecastProvider {
    api: JsonApiClient,
}

impl HttpForecastProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            api: JsonApiClient::new(base_url, None)?,
        })
    }
}

fn missing_field(field: &str) -> OrchestrationError {
    OrchestrationError::ForecastError(format!("forecast response missing '{}'", field))
}

#[async_trait]
impl ForecastProvider for HttpForecastProvider {
    async fn compute(&self, client_id: &str, horizon_months: u32) -> Result<FinancialMetrics> {
        let body = self
            .api
            .post_json(
                "/forecast",
                &json!({
                    "client_name": client_id,
                    "months": horizon_months,
                }),
            )
            .await
            .map_err(|e| {
                warn!(client = %client_id, "Forecast request failed: {}", e);
                OrchestrationError::ForecastError(e)
            })?;

        let metrics = payload(&body)
            .get("metrics")
            .cloned()
            .ok_or_else(|| missing_field("metrics"))?;

        let metrics: FinancialMetrics = serde_json::from_value(metrics)
            .map_err(|e| OrchestrationError::ForecastError(format!("invalid metrics: {}", e)))?;

        info!(
            client = %client_id,
            horizon_months,
            growth_pct = metrics.growth_pct,
            trend = %metrics.trend_label,
            "Forecast computed"
        );

        Ok(metrics)
    }

    async fn list_clients(&self) -> Result<Vec<String>> {
        let body = self
            .api
            .get_json("/clients")
            .await
            .map_err(OrchestrationError::ForecastError)?;

        let clients = payload(&body)
            .get("clients")
            .and_then(|v| v.as_array())
            .ok_or_else(|| missing_field("clients"))?;

        Ok(clients
            .iter()
            .filter_map(|c| c.as_str().map(str::to_string))
            .collect())
    }
}
