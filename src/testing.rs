//! Scripted provider doubles shared by the unit tests

use crate::error::OrchestrationError;
use crate::models::{FinancialMetrics, RetrievedPassage, SearchHit};
use crate::providers::{ForecastProvider, Retriever, TextGenerator, WebSearch};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct GenerationCall {
    pub system: String,
    pub user: String,
}

/// Answers by system instruction; unscripted instructions get a canned reply
/// quoting the first line of the user message.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: HashMap<&'static str, String>,
    fail_on: Option<&'static str>,
    calls: Mutex<Vec<GenerationCall>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, system: &'static str, text: &str) -> Self {
        self.responses.insert(system, text.to_string());
        self
    }

    pub fn fail_on(mut self, system: &'static str) -> Self {
        self.fail_on = Some(system);
        self
    }

    pub fn calls(&self) -> Vec<GenerationCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(&self, system_instruction: &str, user_message: &str) -> Result<String> {
        self.calls.lock().unwrap().push(GenerationCall {
            system: system_instruction.to_string(),
            user: user_message.to_string(),
        });

        if self.fail_on == Some(system_instruction) {
            return Err(OrchestrationError::GenerationError("model unavailable".into()));
        }

        Ok(self
            .responses
            .get(system_instruction)
            .cloned()
            .unwrap_or_else(|| {
                format!(
                    "generated for: {}",
                    user_message.lines().find(|l| !l.trim().is_empty()).unwrap_or("")
                )
            }))
    }
}

#[derive(Default)]
pub struct StaticRetriever {
    passages: Vec<RetrievedPassage>,
    queries: Mutex<Vec<String>>,
}

impl StaticRetriever {
    pub fn new(passages: Vec<RetrievedPassage>) -> Self {
        Self {
            passages,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn search(&self, query: &str) -> Result<Vec<RetrievedPassage>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.passages.clone())
    }
}

pub struct FailingRetriever;

#[async_trait]
impl Retriever for FailingRetriever {
    async fn search(&self, _query: &str) -> Result<Vec<RetrievedPassage>> {
        Err(OrchestrationError::RetrievalError("connection refused".into()))
    }
}

#[derive(Default)]
pub struct StaticSearch {
    hits: Vec<SearchHit>,
}

impl StaticSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self { hits }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WebSearch for StaticSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
        Ok(self.hits.clone())
    }
}

#[derive(Default)]
pub struct FailingSearch {
    attempts: AtomicUsize,
}

impl FailingSearch {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebSearch for FailingSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(OrchestrationError::SearchError("rate limited".into()))
    }
}

/// Forecast double: fixed metrics for known clients, `ForecastError` otherwise.
pub struct StaticForecast {
    clients: HashMap<String, FinancialMetrics>,
}

impl StaticForecast {
    pub fn new(clients: Vec<(&str, FinancialMetrics)>) -> Self {
        Self {
            clients: clients
                .into_iter()
                .map(|(name, metrics)| (name.to_string(), metrics))
                .collect(),
        }
    }
}

#[async_trait]
impl ForecastProvider for StaticForecast {
    async fn compute(&self, client_id: &str, _horizon_months: u32) -> Result<FinancialMetrics> {
        self.clients.get(client_id).cloned().ok_or_else(|| {
            OrchestrationError::ForecastError(format!("no data for client {}", client_id))
        })
    }

    async fn list_clients(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.clients.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
