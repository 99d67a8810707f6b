use strategy_report_orchestrator::{
    config::Settings,
    models::{FinancialMetrics, TrendLabel},
    providers::ForecastProvider,
    report,
    tools::{forecast::DEFAULT_HORIZON_MONTHS, HttpForecastProvider},
    Pipeline,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Metrics used when no forecast service is reachable
fn sample_metrics() -> FinancialMetrics {
    FinancialMetrics::new(12.5, TrendLabel::Rising, 150_000.0)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let client_name = args.next().unwrap_or_else(|| "Leonardo".to_string());
    let sector = args.next().unwrap_or_else(|| "Aerospace".to_string());
    let question = args.collect::<Vec<_>>().join(" ");

    let settings = Settings::from_env()?;
    info!("{} starting", settings.app_name);

    let metrics = match &settings.forecast_api_base_url {
        Some(url) => {
            let provider = HttpForecastProvider::new(url)?;
            match provider.compute(&client_name, DEFAULT_HORIZON_MONTHS).await {
                Ok(metrics) => metrics,
                Err(e) => {
                    warn!(error = %e, "Forecast failed, falling back to sample metrics");
                    sample_metrics()
                }
            }
        }
        None => sample_metrics(),
    };

    let pipeline = Pipeline::from_settings(&settings).await?;
    let state = pipeline
        .run(&client_name, &sector, metrics, Some(question))
        .await?;

    println!("\n=== {} ({}) ===\n", state.client_name, state.sector);
    for record in &state.completed_stages {
        println!("  {:<20} {} ms", record.stage.name(), record.elapsed_ms);
    }

    let final_report = state.final_report.unwrap_or_default();
    if let Some(strategy) = report::detect_strategy(&final_report) {
        println!("\nStrategy: {}", strategy);
    }
    println!("\n{}", final_report);

    Ok(())
}
