//! Strategy Report Orchestrator
//!
//! Turns a client's revenue forecast into a narrative strategy memo:
//! - Quantitative commentary on the forecast KPIs
//! - Cited research over the internal document index
//! - Recent external news, summarised with sources
//! - An executive synthesis with recommended actions
//!
//! LINEAR PIPELINE:
//! ANALYST → INTERNAL RESEARCHER → RESEARCHER → DIRECTOR → DONE
//!
//! plus a follow-up Q&A side-channel over a generated report.

pub mod api;
pub mod config;
pub mod error;
pub mod gemini;
pub mod models;
pub mod openai;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod report;
pub mod retrieval;
pub mod state;
pub mod tools;

#[cfg(test)]
mod testing;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use pipeline::{Pipeline, Stage};
pub use state::PipelineState;
