//! Report handed to the notification collaborator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::indicators::IndicatorBundle;
use crate::models::market::MarketContext;
use crate::models::signal::{ScoredCandidate, TradeLevels};

/// Why an asset did not reach scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    DataUnavailable { detail: String },
    InsufficientData { required: usize, available: usize },
    InvalidData { detail: String },
    InvalidPrice { price: f64 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataUnavailable { detail } => write!(f, "data unavailable: {}", detail),
            Self::InsufficientData {
                required,
                available,
            } => write!(f, "insufficient data: {} of {} samples", available, required),
            Self::InvalidData { detail } => write!(f, "invalid data: {}", detail),
            Self::InvalidPrice { price } => write!(f, "invalid price: {}", price),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedAsset {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Counts for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Symbols in the requested universe
    pub evaluated: usize,
    pub data_unavailable: usize,
    pub insufficient_data: usize,
    pub invalid_data: usize,
    pub invalid_price: usize,
    /// Scored assets at or above the market-cap floor
    pub passed_filter: usize,
    /// Candidates at or above the minimum score, before the cap
    pub passed_cutoff: usize,
    pub reported: usize,
}

impl RunSummary {
    pub fn skipped(&self) -> usize {
        self.data_unavailable + self.insufficient_data + self.invalid_data + self.invalid_price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub rank: usize,
    pub name: String,
    pub pair: String,
    pub candidate: ScoredCandidate,
    pub levels: TradeLevels,
    pub indicators: IndicatorBundle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_change_24h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_change_7d: Option<f64>,
    pub high_score: bool,
}

/// Ranked candidates of one analysis run, best first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub summary: RunSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_context: Option<MarketContext>,
    pub entries: Vec<ReportEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedAsset>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn high_score_entries(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| e.high_score)
    }
}
