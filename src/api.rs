//! REST API Server for the strategy report pipeline
//!
//! Exposes the pipeline, the Q&A side-channel and the forecast service
//! over HTTP.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::OrchestrationError;
use crate::models::FinancialMetrics;
use crate::pipeline::Pipeline;
use crate::providers::ForecastProvider;
use crate::report;
use crate::tools::forecast::DEFAULT_HORIZON_MONTHS;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnalysisRequest {
    pub client_name: String,
    pub sector: String,
    /// Computed through the forecast provider when absent
    #[serde(default)]
    pub metrics: Option<FinancialMetrics>,
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    pub context_report: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub client_name: String,
    #[serde(default = "default_months")]
    pub months: u32,
}

fn default_months() -> u32 {
    DEFAULT_HORIZON_MONTHS
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn failure(error: &OrchestrationError) -> ApiResult {
    let status = match error {
        OrchestrationError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        OrchestrationError::ForecastError(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiResponse::error(error.to_string())))
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<Pipeline>,
    pub forecast: Option<Arc<dyn ForecastProvider>>,
}

impl ApiState {
    fn forecast(&self) -> Result<&Arc<dyn ForecastProvider>, OrchestrationError> {
        self.forecast.as_ref().ok_or_else(|| {
            OrchestrationError::InvalidRequest(
                "metrics were not supplied and FORECAST_API_BASE_URL is not configured".to_string(),
            )
        })
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Pipeline Endpoint
/// =============================

async fn analyze(
    State(state): State<ApiState>,
    Json(req): Json<AnalysisRequest>,
) -> ApiResult {
    info!(client = %req.client_name, sector = %req.sector, "Received analysis request");

    // Forecast unavailability is a precondition failure, handled before the run
    let metrics = match req.metrics {
        Some(metrics) => metrics,
        None => {
            let provider = match state.forecast() {
                Ok(provider) => provider,
                Err(e) => return failure(&e),
            };
            match provider.compute(&req.client_name, DEFAULT_HORIZON_MONTHS).await {
                Ok(metrics) => metrics,
                Err(e) => {
                    warn!(client = %req.client_name, error = %e, "Forecast unavailable");
                    return failure(&e);
                }
            }
        }
    };

    match state
        .pipeline
        .run(&req.client_name, &req.sector, metrics, req.question)
        .await
    {
        Ok(result) => {
            let strategy = result.final_report.as_deref().and_then(report::detect_strategy);
            (
                StatusCode::OK,
                Json(ApiResponse::success(serde_json::json!({
                    "run_id": result.run_id,
                    "financial_metrics": result.financial_metrics,
                    "analyst_output": result.analyst_output,
                    "internal_research_output": result.internal_research_output,
                    "researcher_output": result.researcher_output,
                    "final_report": result.final_report,
                    "strategy": strategy,
                    "stages": result.completed_stages,
                }))),
            )
        }
        Err(e) => failure(&e),
    }
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat(State(state): State<ApiState>, Json(req): Json<ChatRequest>) -> ApiResult {
    match state.pipeline.answer(&req.question, &req.context_report).await {
        Ok(answer) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({ "answer": answer }))),
        ),
        Err(e) => failure(&e),
    }
}

/// =============================
/// Forecast Endpoints
/// =============================

async fn forecast(State(state): State<ApiState>, Json(req): Json<ForecastRequest>) -> ApiResult {
    let provider = match state.forecast() {
        Ok(provider) => provider,
        Err(e) => return failure(&e),
    };

    match provider.compute(&req.client_name, req.months).await {
        Ok(metrics) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({ "metrics": metrics }))),
        ),
        Err(e) => failure(&e),
    }
}

async fn clients(State(state): State<ApiState>) -> ApiResult {
    let provider = match state.forecast() {
        Ok(provider) => provider,
        Err(e) => return failure(&e),
    };

    match provider.list_clients().await {
        Ok(clients) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({ "clients": clients }))),
        ),
        Err(e) => failure(&e),
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(
    pipeline: Arc<Pipeline>,
    forecast_provider: Option<Arc<dyn ForecastProvider>>,
) -> Router {
    let state = ApiState {
        pipeline,
        forecast: forecast_provider,
    };

    Router::new()
        .route("/health", get(health))
        .route("/agent/analyze", post(analyze))
        .route("/agent/chat", post(chat))
        .route("/forecast", post(forecast))
        .route("/clients", get(clients))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    pipeline: Arc<Pipeline>,
    forecast_provider: Option<Arc<dyn ForecastProvider>>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(pipeline, forecast_provider);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
