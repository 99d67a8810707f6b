use std::sync::Arc;
use strategy_report_orchestrator::{
    api::start_server,
    config::Settings,
    providers::ForecastProvider,
    tools::HttpForecastProvider,
    Pipeline,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load environment variables
    let settings = Settings::from_env()?;

    info!("{} - API Server", settings.app_name);
    info!("Port: {}", settings.port);

    let pipeline = Arc::new(Pipeline::from_settings(&settings).await?);

    let forecast: Option<Arc<dyn ForecastProvider>> = match &settings.forecast_api_base_url {
        Some(url) => {
            info!(url = %url, "Forecast service configured");
            let provider: Arc<dyn ForecastProvider> = Arc::new(HttpForecastProvider::new(url)?);
            Some(provider)
        }
        None => {
            warn!("FORECAST_API_BASE_URL not set; /agent/analyze requires explicit metrics");
            None
        }
    };

    info!("Pipeline initialized, starting API server...");

    start_server(pipeline, forecast, settings.port).await?;

    Ok(())
}
