//! Structure checks for the director's memo
//!
//! The 2×2 decision rule lives in the director's instruction only. What can
//! be checked in code is the memo's shape: the three section headers, and
//! which strategy (if any) it names.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const EXECUTIVE_SUMMARY: &str = "### Executive Summary";
pub const CROSS_ANALYSIS: &str = "### Cross-Analysis";
pub const RECOMMENDED_ACTIONS: &str = "### Recommended Actions";

pub const SECTION_HEADERS: [&str; 3] = [EXECUTIVE_SUMMARY, CROSS_ANALYSIS, RECOMMENDED_ACTIONS];

const OMITTED_NOTE: &str = "_This section was not produced by the model._";

/// The four outcomes of the trend × sentiment rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StrategyQuadrant {
    AggressiveUpsell,
    Caution,
    TurnaroundInvestment,
    CrisisPlan,
}

impl StrategyQuadrant {
    fn keywords(self) -> &'static [&'static str] {
        match self {
            StrategyQuadrant::AggressiveUpsell => &["upsell", "up-sell"],
            StrategyQuadrant::Caution => &["caution", "retention risk", "churn"],
            StrategyQuadrant::TurnaroundInvestment => &["turnaround", "win the client back", "invest to recover"],
            StrategyQuadrant::CrisisPlan => &["crisis plan", "crisis"],
        }
    }
}

impl fmt::Display for StrategyQuadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StrategyQuadrant::AggressiveUpsell => "Aggressive Upsell",
            StrategyQuadrant::Caution => "Caution",
            StrategyQuadrant::TurnaroundInvestment => "Turnaround Investment",
            StrategyQuadrant::CrisisPlan => "Crisis Plan",
        };
        write!(f, "{}", s)
    }
}

/// Lowercased alphanumerics only, so "Cross Analysis" and "cross-analysis"
/// compare equal.
fn normalize_title(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Section headers absent from `report`. Matching ignores case, spacing,
/// punctuation and any decoration (emoji, numbering) after the `#` marker.
pub fn missing_sections(report: &str) -> Vec<&'static str> {
    let headings: Vec<String> = report
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('#'))
        .map(normalize_title)
        .collect();

    SECTION_HEADERS
        .into_iter()
        .filter(|header| {
            let title = normalize_title(header);
            !headings.iter().any(|h| h.contains(&title))
        })
        .collect()
}

/// Append every missing section header with a note, so the memo always
/// carries the three fixed sections.
pub fn ensure_sections(report: &str) -> String {
    let missing = missing_sections(report);
    if missing.is_empty() {
        return report.to_string();
    }

    let mut out = report.trim_end().to_string();
    for header in missing {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(header);
        out.push('\n');
        out.push_str(OMITTED_NOTE);
    }
    out
}

/// First strategy named in the recommended-actions section (or anywhere in
/// the memo if that section is missing).
pub fn detect_strategy(report: &str) -> Option<StrategyQuadrant> {
    let lowered = report.to_lowercase();
    let title = RECOMMENDED_ACTIONS.trim_start_matches('#').trim().to_lowercase();
    let section = lowered
        .find(&title)
        .map(|start| &lowered[start..])
        .unwrap_or(&lowered);

    const ALL: [StrategyQuadrant; 4] = [
        StrategyQuadrant::AggressiveUpsell,
        StrategyQuadrant::Caution,
        StrategyQuadrant::TurnaroundInvestment,
        StrategyQuadrant::CrisisPlan,
    ];

    ALL.into_iter()
        .filter_map(|q| {
            q.keywords()
                .iter()
                .filter_map(|kw| section.find(kw))
                .min()
                .map(|pos| (pos, q))
        })
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, q)| q)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "### 📊 Executive Summary\nGrowth is solid.\n\n### 🧠 Cross-Analysis\nData and news agree.\n\n### 🚀 Recommended Actions\nStrategy: Aggressive Upsell\n1. Propose avionics extension";

    #[test]
    fn test_decorated_headers_accepted() {
        assert!(missing_sections(FULL).is_empty());
        assert_eq!(ensure_sections(FULL), FULL);
    }

    #[test]
    fn test_header_spelling_variants_accepted() {
        let memo = "### Executive summary\nGrowth is solid.\n\n### Cross Analysis\nData and news agree.\n\n### 3. RECOMMENDED-ACTIONS\nCrisis plan";
        assert!(missing_sections(memo).is_empty());

        let fixed = ensure_sections(memo);
        assert_eq!(fixed, memo);
        assert!(!fixed.contains(CROSS_ANALYSIS));
        assert!(!fixed.contains(OMITTED_NOTE));
    }

    #[test]
    fn test_missing_sections_appended() {
        let fixed = ensure_sections("Just a paragraph.");
        assert!(fixed.starts_with("Just a paragraph."));
        for header in SECTION_HEADERS {
            assert!(fixed.contains(header));
        }
        assert!(missing_sections(&fixed).is_empty());
    }

    #[test]
    fn test_detect_strategy_prefers_actions_section() {
        let report = "### Executive Summary\nNo crisis in sight.\n### Cross-Analysis\n...\n### Recommended Actions\nCaution: retention risk is high.";
        assert_eq!(detect_strategy(report), Some(StrategyQuadrant::Caution));
        assert_eq!(detect_strategy(FULL), Some(StrategyQuadrant::AggressiveUpsell));
        assert_eq!(detect_strategy("### Recommended Actions\nTBD"), None);
    }
}
