use thiserror::Error;

use crate::models::report::SkipReason;
use crate::models::series::SeriesError;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },
    #[error("rate limited by upstream")]
    RateLimited,
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),
    #[error("invalid price series for {symbol}: {source}")]
    InvalidSeries {
        symbol: String,
        #[source]
        source: SeriesError,
    },
    #[error("upstream returned status {status}")]
    Status { status: u16 },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl DataError {
    pub fn unavailable(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    /// How the pipeline records this failure for the asset
    pub fn skip_reason(&self) -> SkipReason {
        match self {
            Self::InvalidSeries { source, .. } => SkipReason::InvalidData {
                detail: source.to_string(),
            },
            other => SkipReason::DataUnavailable {
                detail: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifier credentials not configured")]
    NotConfigured,
    #[error("notification rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
