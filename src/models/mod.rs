//! Shared data models spanning the engine layers.

pub mod asset;
pub mod indicators;
pub mod market;
pub mod report;
pub mod series;
pub mod signal;

pub use asset::AssetMeta;
pub use indicators::{
    AtrIndicator, EmaIndicator, IndicatorBundle, MacdIndicator, RsiIndicator, TrendDirection,
    TrendIndicator, VolumeIndicator,
};
pub use market::MarketContext;
pub use report::{Report, ReportEntry, RunSummary, SkipReason, SkippedAsset};
pub use series::{Candle, PriceSeries, SeriesError};
pub use signal::{AssetEvaluation, ScoredCandidate, SubScores, TradeLevels};
