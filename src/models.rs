//! Core data models for the strategy report pipeline

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendLabel {
    Rising,
    Falling,
}

//
// ================= Metrics =================
//

/// KPIs produced by the forecast provider (or supplied by the caller).
///
/// Every stage treats these as opaque input; they are only rendered into
/// prompt text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialMetrics {
    pub growth_pct: f64,
    pub trend_label: TrendLabel,
    pub projected_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_period_value: Option<f64>,
    /// Additional KPIs kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl FinancialMetrics {
    pub fn new(growth_pct: f64, trend_label: TrendLabel, projected_value: f64) -> Self {
        Self {
            growth_pct,
            trend_label,
            projected_value,
            confidence_low: None,
            confidence_high: None,
            last_period_value: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_confidence(mut self, low: f64, high: f64) -> Self {
        self.confidence_low = Some(low);
        self.confidence_high = Some(high);
        self
    }

    /// Render as `key: value` lines, known KPIs first, extras in key order.
    pub fn to_prompt_text(&self) -> String {
        let mut lines = vec![
            format!("growth_pct: {}", self.growth_pct),
            format!("trend_label: {}", self.trend_label),
            format!("projected_value: {}", self.projected_value),
        ];

        if let Some(v) = self.last_period_value {
            lines.push(format!("last_period_value: {}", v));
        }
        if let Some(v) = self.confidence_low {
            lines.push(format!("confidence_low: {}", v));
        }
        if let Some(v) = self.confidence_high {
            lines.push(format!("confidence_high: {}", v));
        }
        for (key, value) in &self.extra {
            lines.push(format!("{}: {}", key, value));
        }

        lines.join("\n")
    }
}

//
// ================= Provider Results =================
//

/// One passage returned by the internal document index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedPassage {
    pub content: String,
    pub source: String,
}

impl RetrievedPassage {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
        }
    }
}

/// One web search result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub snippet: String,
    pub url: String,
}

impl SearchHit {
    pub fn new(snippet: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            snippet: snippet.into(),
            url: url.into(),
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendLabel::Rising => "rising",
            TrendLabel::Falling => "falling",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_deserialize_with_extras() {
        let json = serde_json::json!({
            "growth_pct": 12.5,
            "trend_label": "rising",
            "projected_value": 150000.0,
            "backlog_months": 7
        });

        let metrics: FinancialMetrics = serde_json::from_value(json).unwrap();
        assert_eq!(metrics.trend_label, TrendLabel::Rising);
        assert!(metrics.confidence_low.is_none());
        assert_eq!(metrics.extra.get("backlog_months"), Some(&serde_json::json!(7)));
    }

    #[test]
    fn test_prompt_text_lists_populated_kpis() {
        let metrics = FinancialMetrics::new(-4.2, TrendLabel::Falling, 80_000.0)
            .with_confidence(60_000.0, 95_000.0);
        let text = metrics.to_prompt_text();

        assert!(text.contains("trend_label: falling"));
        assert!(text.contains("confidence_low: 60000"));
        assert!(!text.contains("last_period_value"));
    }

    #[test]
    fn test_unknown_trend_rejected() {
        let json = serde_json::json!({
            "growth_pct": 1.0,
            "trend_label": "sideways",
            "projected_value": 1.0
        });
        assert!(serde_json::from_value::<FinancialMetrics>(json).is_err());
    }
}
