use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmaIndicator {
    pub value: f64,
    /// Value one bar earlier, when the series is long enough
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<f64>,
    pub period: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiIndicator {
    pub value: f64,
    pub period: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdIndicator {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    /// Histogram one bar earlier
    pub previous_histogram: f64,
    pub period: (u32, u32, u32),
}

impl MacdIndicator {
    /// Histogram crossed from non-positive to positive on the latest bar
    pub fn turned_positive(&self) -> bool {
        self.previous_histogram <= 0.0 && self.histogram > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtrIndicator {
    pub value: f64,
    pub period: u32,
}

impl AtrIndicator {
    /// ATR as a percentage of `price`
    pub fn percent_of(&self, price: f64) -> f64 {
        if price <= 0.0 {
            return 0.0;
        }
        self.value / price * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeIndicator {
    pub volume: f64,
    /// Mean volume of the samples preceding the latest one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_ma: Option<f64>,
    pub volume_ma_period: u32,
}

impl VolumeIndicator {
    /// Latest volume over its trailing baseline. `None` when the series
    /// carries no volume.
    pub fn ratio(&self) -> Option<f64> {
        match self.volume_ma {
            Some(ma) if ma > 0.0 => Some(self.volume / ma),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Bullish,
    Bearish,
    Neutral,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// Direction of the close-to-close change over the last `period` bars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendIndicator {
    pub direction: TrendDirection,
    pub change_pct: f64,
    /// 0 when neutral, otherwise grows with the size of the move
    pub strength: f64,
    pub period: u32,
}

/// Per-asset indicator snapshot for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorBundle {
    pub symbol: String,
    pub close: f64,
    pub ema_fast: EmaIndicator,
    pub ema_slow: EmaIndicator,
    pub rsi: RsiIndicator,
    pub macd: MacdIndicator,
    pub atr: AtrIndicator,
    pub volume: VolumeIndicator,
    pub trend: TrendIndicator,
    /// Bars since the fast EMA last crossed above the slow EMA, if that
    /// happened inside the inspected window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bars_since_cross: Option<usize>,
}

impl IndicatorBundle {
    pub fn ema_bullish(&self) -> bool {
        self.ema_fast.value > self.ema_slow.value
    }

    /// Price above the fast EMA, which is above the slow EMA
    pub fn ema_aligned(&self, price: f64) -> bool {
        price > self.ema_fast.value && self.ema_bullish()
    }
}
