//! Analysis report types

use crate::market::StockSnapshot;
use crate::ticker::Ticker;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The three analytical branches run by the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Fundamental,
    Valuation,
    Risk,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 3] = [Self::Fundamental, Self::Valuation, Self::Risk];

    /// Human-readable section title
    pub fn label(self) -> &'static str {
        match self {
            Self::Fundamental => "Fundamental analysis",
            Self::Valuation => "Valuation analysis",
            Self::Risk => "Risk analysis",
        }
    }

    /// Name of the agent descriptor that serves this branch
    pub fn agent_name(self) -> &'static str {
        match self {
            Self::Fundamental => crate::agents::names::FUNDAMENTAL,
            Self::Valuation => crate::agents::names::VALUATION,
            Self::Risk => crate::agents::names::RISK,
        }
    }

    /// Signal values the model may report for this branch
    pub fn signals(self) -> &'static [&'static str] {
        match self {
            Self::Fundamental => &["strong", "stable", "weak"],
            Self::Valuation => &["undervalued", "fairly valued", "overvalued"],
            Self::Risk => &["low", "moderate", "high"],
        }
    }

    /// Normalise a model-reported signal, dropping anything not in [`signals`](Self::signals)
    pub fn normalize_signal(self, raw: &str) -> Option<String> {
        let cleaned = raw.trim().to_lowercase().replace(['_', '-'], " ");
        let cleaned = cleaned.strip_suffix(" risk").unwrap_or(&cleaned);
        self.signals()
            .iter()
            .find(|s| **s == cleaned)
            .map(|s| s.to_string())
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Validated output of one analytical branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: AnalysisKind,
    pub summary: String,
    pub key_points: Vec<String>,
    pub signal: Option<String>,
    /// Figures computed from the snapshot that grounded the analysis
    pub metrics: BTreeMap<String, f64>,
}

/// A report section, present whether or not its branch succeeded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Section {
    Available(Finding),
    Unavailable { reason: String },
}

impl Section {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn finding(&self) -> Option<&Finding> {
        match self {
            Self::Available(finding) => Some(finding),
            Self::Unavailable { .. } => None,
        }
    }
}

/// The aggregated result of a full analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub ticker: Ticker,
    pub as_of: DateTime<Utc>,
    pub data_snapshot: StockSnapshot,
    pub fundamental: Section,
    pub valuation: Section,
    pub risk: Section,
    pub narrative_summary: String,
}

impl AnalysisReport {
    /// Section for one analytical branch
    pub fn section(&self, kind: AnalysisKind) -> &Section {
        match kind {
            AnalysisKind::Fundamental => &self.fundamental,
            AnalysisKind::Valuation => &self.valuation,
            AnalysisKind::Risk => &self.risk,
        }
    }

    /// Branches whose section is marked unavailable
    pub fn unavailable(&self) -> Vec<AnalysisKind> {
        AnalysisKind::ALL
            .into_iter()
            .filter(|kind| !self.section(*kind).is_available())
            .collect()
    }
}
