//! Error types for the strategy report orchestrator

use thiserror::Error;

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, OrchestrationError>;

#[derive(Error, Debug)]
pub enum OrchestrationError {

    // =============================
    // Provider Errors
    // =============================

    /// Fatal to a pipeline run: never caught by the stages.
    #[error("Generation error: {0}")]
    GenerationError(String),

    #[error("Retrieval error: {0}")]
    RetrievalError(String),

    #[error("Search error: {0}")]
    SearchError(String),

    #[error("Forecast error: {0}")]
    ForecastError(String),

    // =============================
    // Core Pipeline Errors
    // =============================

    #[error("State error: {0}")]
    StateError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let err: OrchestrationError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "index.json").into();
        assert!(matches!(err, OrchestrationError::IoError(_)));
        assert!(err.to_string().contains("index.json"));
    }

    #[test]
    fn test_display_includes_detail() {
        let err = OrchestrationError::ConfigError("GEMINI_API_KEY not set".into());
        assert_eq!(err.to_string(), "Configuration error: GEMINI_API_KEY not set");
    }
}
