//! Per-run pipeline state
//!
//! Created fresh by every `Pipeline::run` and handed back to the caller.
//! Stages never mutate it directly: each returns a `StatePatch` that the
//! orchestrator applies through `PipelineState::apply`.

use crate::error::OrchestrationError;
use crate::models::FinancialMetrics;
use crate::pipeline::{Stage, StateField};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use uuid::Uuid;

/// Completion record for one stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageRecord {
    pub stage: Stage,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    pub run_id: Uuid,
    pub client_name: String,
    pub sector: String,
    pub financial_metrics: FinancialMetrics,
    pub user_question: Option<String>,

    pub analyst_output: Option<String>,
    pub internal_research_evidence: Option<String>,
    pub internal_research_output: Option<String>,
    pub researcher_output: Option<String>,
    pub final_report: Option<String>,

    pub completed_stages: Vec<StageRecord>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Partial update returned by a stage. Only the slots the stage owns may be
/// filled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    pub analyst_output: Option<String>,
    pub internal_research_evidence: Option<String>,
    pub internal_research_output: Option<String>,
    pub researcher_output: Option<String>,
    pub final_report: Option<String>,
}

impl StatePatch {
    pub fn analyst(output: String) -> Self {
        Self {
            analyst_output: Some(output),
            ..Self::default()
        }
    }

    pub fn internal_research(evidence: String, output: String) -> Self {
        Self {
            internal_research_evidence: Some(evidence),
            internal_research_output: Some(output),
            ..Self::default()
        }
    }

    pub fn researcher(output: String) -> Self {
        Self {
            researcher_output: Some(output),
            ..Self::default()
        }
    }

    pub fn director(report: String) -> Self {
        Self {
            final_report: Some(report),
            ..Self::default()
        }
    }

    fn slot(&self, field: StateField) -> Option<&String> {
        match field {
            StateField::AnalystOutput => self.analyst_output.as_ref(),
            StateField::InternalResearchEvidence => self.internal_research_evidence.as_ref(),
            StateField::InternalResearchOutput => self.internal_research_output.as_ref(),
            StateField::ResearcherOutput => self.researcher_output.as_ref(),
            StateField::FinalReport => self.final_report.as_ref(),
        }
    }

    fn filled(&self) -> impl Iterator<Item = StateField> + '_ {
        const ALL: [StateField; 5] = [
            StateField::AnalystOutput,
            StateField::InternalResearchEvidence,
            StateField::InternalResearchOutput,
            StateField::ResearcherOutput,
            StateField::FinalReport,
        ];
        ALL.into_iter().filter(move |f| self.slot(*f).is_some())
    }
}

/// Inputs hashed for `PipelineState::inputs_fingerprint`
#[derive(Serialize)]
struct RunInputs<'a> {
    client_name: &'a str,
    sector: &'a str,
    financial_metrics: &'a FinancialMetrics,
    user_question: Option<&'a str>,
}

impl PipelineState {
    pub fn new(
        client_name: impl Into<String>,
        sector: impl Into<String>,
        financial_metrics: FinancialMetrics,
        user_question: Option<String>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            client_name: client_name.into(),
            sector: sector.into(),
            financial_metrics,
            user_question: user_question.filter(|q| !q.trim().is_empty()),
            analyst_output: None,
            internal_research_evidence: None,
            internal_research_output: None,
            researcher_output: None,
            final_report: None,
            completed_stages: Vec::with_capacity(Stage::ORDER.len()),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn get(&self, field: StateField) -> Option<&str> {
        match field {
            StateField::AnalystOutput => self.analyst_output.as_deref(),
            StateField::InternalResearchEvidence => self.internal_research_evidence.as_deref(),
            StateField::InternalResearchOutput => self.internal_research_output.as_deref(),
            StateField::ResearcherOutput => self.researcher_output.as_deref(),
            StateField::FinalReport => self.final_report.as_deref(),
        }
    }

    fn slot_mut(&mut self, field: StateField) -> &mut Option<String> {
        match field {
            StateField::AnalystOutput => &mut self.analyst_output,
            StateField::InternalResearchEvidence => &mut self.internal_research_evidence,
            StateField::InternalResearchOutput => &mut self.internal_research_output,
            StateField::ResearcherOutput => &mut self.researcher_output,
            StateField::FinalReport => &mut self.final_report,
        }
    }

    /// Text a stage reads; absent only if the stage ran out of order.
    pub fn require(&self, field: StateField) -> Result<&str> {
        self.get(field).ok_or_else(|| {
            OrchestrationError::StateError(format!("{} has not been produced yet", field))
        })
    }

    /// Merge a stage's patch.
    ///
    /// Rejected when an earlier stage has not completed, when the patch
    /// touches a field the stage does not own or that is already written,
    /// or when the stage leaves one of its own fields empty.
    pub fn apply(&mut self, stage: Stage, patch: StatePatch) -> Result<()> {
        if stage.is_terminal() {
            return Err(OrchestrationError::StateError(
                "the terminal stage produces no output".to_string(),
            ));
        }

        for earlier in Stage::ORDER.iter().take_while(|s| **s < stage) {
            for field in earlier.owned_fields() {
                if self.get(*field).is_none() {
                    return Err(OrchestrationError::StateError(format!(
                        "{} ran before {} produced {}",
                        stage, earlier, field
                    )));
                }
            }
        }

        for field in patch.filled() {
            if field.owner() != stage {
                return Err(OrchestrationError::StateError(format!(
                    "{} may not write {} (owned by {})",
                    stage,
                    field,
                    field.owner()
                )));
            }
            if self.get(field).is_some() {
                return Err(OrchestrationError::StateError(format!(
                    "{} is already written",
                    field
                )));
            }
        }

        for field in stage.owned_fields() {
            if patch.slot(*field).is_none() {
                return Err(OrchestrationError::StateError(format!(
                    "{} did not produce {}",
                    stage, field
                )));
            }
        }

        let StatePatch {
            analyst_output,
            internal_research_evidence,
            internal_research_output,
            researcher_output,
            final_report,
        } = patch;

        let values = [
            (StateField::AnalystOutput, analyst_output),
            (StateField::InternalResearchEvidence, internal_research_evidence),
            (StateField::InternalResearchOutput, internal_research_output),
            (StateField::ResearcherOutput, researcher_output),
            (StateField::FinalReport, final_report),
        ];
        for (field, value) in values {
            if value.is_some() {
                *self.slot_mut(field) = value;
            }
        }

        Ok(())
    }

    pub(crate) fn record_stage(&mut self, stage: Stage, elapsed_ms: u64) {
        self.completed_stages.push(StageRecord { stage, elapsed_ms });
    }

    pub(crate) fn mark_completed(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// `final_report` is set only after every stage completed.
    pub fn is_complete(&self) -> bool {
        self.final_report.is_some()
    }

    /// SHA-256 (hex) over the run inputs, for correlating logs of runs with
    /// identical inputs.
    pub fn inputs_fingerprint(&self) -> String {
        let inputs = RunInputs {
            client_name: &self.client_name,
            sector: &self.sector,
            financial_metrics: &self.financial_metrics,
            user_question: self.user_question.as_deref(),
        };

        let mut hasher = Sha256::new();

        // Stream JSON directly into hasher (no intermediate String)
        if serde_json::to_writer(&mut HashWriter(&mut hasher), &inputs).is_err() {
            return String::new();
        }

        hex::encode(hasher.finalize())
    }
}

/// Adapter to allow writing into Sha256 via std::io::Write
struct HashWriter<'a, H: Digest>(&'a mut H);

impl<'a, H: Digest> Write for HashWriter<'a, H> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
