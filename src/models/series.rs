//! OHLCV samples and the validated per-asset price series

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One OHLCV sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
}

impl Candle {
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("sample {index} is not after the previous timestamp")]
    Unordered { index: usize },
    #[error("sample {index} has a non-finite or negative value")]
    NonFinite { index: usize },
    #[error("sample {index} has high {high} below low {low}")]
    InvertedRange { index: usize, high: f64, low: f64 },
}

/// Ordered OHLCV samples for one asset.
///
/// Timestamps are strictly ascending and every value is finite and
/// non-negative. Length is not checked here; indicators report
/// `InsufficientData` themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    candles: Vec<Candle>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, candles: Vec<Candle>) -> Result<Self, SeriesError> {
        for (index, candle) in candles.iter().enumerate() {
            let values = [candle.open, candle.high, candle.low, candle.close, candle.volume];
            if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(SeriesError::NonFinite { index });
            }
            if candle.high < candle.low {
                return Err(SeriesError::InvertedRange {
                    index,
                    high: candle.high,
                    low: candle.low,
                });
            }
            if index > 0 && candle.timestamp <= candles[index - 1].timestamp {
                return Err(SeriesError::Unordered { index });
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            candles,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }
}

impl AsRef<[Candle]> for PriceSeries {
    fn as_ref(&self) -> &[Candle] {
        &self.candles
    }
}
