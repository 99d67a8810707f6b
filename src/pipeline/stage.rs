//! Stage identifiers and the linear transition function
//!
//! analyst → internal_researcher → researcher → director → done

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Analyst,
    InternalResearcher,
    Researcher,
    Director,
    Done,
}

/// A stage-owned output slot of the pipeline state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StateField {
    AnalystOutput,
    InternalResearchEvidence,
    InternalResearchOutput,
    ResearcherOutput,
    FinalReport,
}

impl Stage {
    pub const FIRST: Stage = Stage::Analyst;

    /// Every stage that produces output, in execution order.
    pub const ORDER: [Stage; 4] = [
        Stage::Analyst,
        Stage::InternalResearcher,
        Stage::Researcher,
        Stage::Director,
    ];

    /// Total: `Done` maps to itself.
    pub fn next(self) -> Stage {
        match self {
            Stage::Analyst => Stage::InternalResearcher,
            Stage::InternalResearcher => Stage::Researcher,
            Stage::Researcher => Stage::Director,
            Stage::Director => Stage::Done,
            Stage::Done => Stage::Done,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::Done
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Analyst => "analyst",
            Stage::InternalResearcher => "internal_researcher",
            Stage::Researcher => "researcher",
            Stage::Director => "director",
            Stage::Done => "done",
        }
    }

    pub fn owned_fields(self) -> &'static [StateField] {
        match self {
            Stage::Analyst => &[StateField::AnalystOutput],
            Stage::InternalResearcher => &[
                StateField::InternalResearchEvidence,
                StateField::InternalResearchOutput,
            ],
            Stage::Researcher => &[StateField::ResearcherOutput],
            Stage::Director => &[StateField::FinalReport],
            Stage::Done => &[],
        }
    }
}

impl StateField {
    pub fn owner(self) -> Stage {
        match self {
            StateField::AnalystOutput => Stage::Analyst,
            StateField::InternalResearchEvidence | StateField::InternalResearchOutput => {
                Stage::InternalResearcher
            }
            StateField::ResearcherOutput => Stage::Researcher,
            StateField::FinalReport => Stage::Director,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StateField::AnalystOutput => "analyst_output",
            StateField::InternalResearchEvidence => "internal_research_evidence",
            StateField::InternalResearchOutput => "internal_research_output",
            StateField::ResearcherOutput => "researcher_output",
            StateField::FinalReport => "final_report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_walks_order_then_stops() {
        let mut visited = Vec::new();
        let mut stage = Stage::FIRST;
        while !stage.is_terminal() {
            visited.push(stage);
            stage = stage.next();
        }

        assert_eq!(visited, Stage::ORDER.to_vec());
        assert_eq!(Stage::Done.next(), Stage::Done);
    }

    #[test]
    fn test_every_field_has_exactly_one_owner() {
        for stage in Stage::ORDER {
            for field in stage.owned_fields() {
                assert_eq!(field.owner(), stage);
            }
        }
        assert!(Stage::Done.owned_fields().is_empty());
    }

    #[test]
    fn test_names_match_serde() {
        let json = serde_json::to_string(&Stage::InternalResearcher).unwrap();
        assert_eq!(json, "\"internal_researcher\"");
        assert_eq!(Stage::InternalResearcher.to_string(), "internal_researcher");
    }
}
