//! Environment configuration
//!
//! Values come from the process environment, optionally seeded from a
//! `.env` file.

use crate::error::OrchestrationError;
use crate::Result;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_APP_NAME: &str = "Strategy Report Orchestrator";
const DEFAULT_RAG_INDEX_PATH: &str = "./data/rag/index.json";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Gemini,
    OpenAi,
}

impl FromStr for LlmProvider {
    type Err = OrchestrationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "openai" | "open_ai" | "open-ai" => Ok(LlmProvider::OpenAi),
            other => Err(OrchestrationError::ConfigError(format!(
                "unknown LLM_PROVIDER '{}' (expected gemini or openai)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub app_name: String,
    pub llm_provider: LlmProvider,
    pub llm_api_key: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub openai_base_url: String,
    pub tavily_api_key: Option<String>,
    pub search_max_results: usize,
    pub rag_index_path: PathBuf,
    pub rag_top_k: usize,
    pub forecast_api_base_url: Option<String>,
    pub port: u16,
}

impl Settings {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let llm_provider = match get("LLM_PROVIDER") {
            Some(value) => value.parse()?,
            None => LlmProvider::Gemini,
        };

        let (key_var, model_var, default_model) = match llm_provider {
            LlmProvider::Gemini => ("GEMINI_API_KEY", "GEMINI_MODEL", crate::gemini::DEFAULT_MODEL),
            LlmProvider::OpenAi => ("OPENAI_API_KEY", "OPENAI_MODEL", crate::openai::DEFAULT_MODEL),
        };

        let llm_api_key = get(key_var).ok_or_else(|| {
            OrchestrationError::ConfigError(format!("{} is not set", key_var))
        })?;

        Ok(Self {
            app_name: get("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            llm_provider,
            llm_api_key,
            llm_model: get(model_var).unwrap_or_else(|| default_model.to_string()),
            llm_temperature: parse_or("LLM_TEMPERATURE", get("LLM_TEMPERATURE"), 0.0)?,
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| crate::openai::DEFAULT_BASE_URL.to_string()),
            tavily_api_key: get("TAVILY_API_KEY"),
            search_max_results: parse_or(
                "SEARCH_MAX_RESULTS",
                get("SEARCH_MAX_RESULTS"),
                crate::tools::search::DEFAULT_MAX_RESULTS,
            )?,
            rag_index_path: get("RAG_INDEX_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RAG_INDEX_PATH)),
            rag_top_k: parse_or("RAG_TOP_K", get("RAG_TOP_K"), crate::retrieval::DEFAULT_TOP_K)?,
            forecast_api_base_url: get("FORECAST_API_BASE_URL"),
            port: parse_or("PORT", get("PORT").or_else(|| get("API_PORT")), DEFAULT_PORT)?,
        })
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        Some(raw) => raw.parse().map_err(|_| {
            OrchestrationError::ConfigError(format!("{} has invalid value '{}'", key, raw))
        }),
        None => Ok(default),
    }
}
