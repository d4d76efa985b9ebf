//! Short-term price trend from the close-to-close change

use crate::indicators::IndicatorError;
use crate::models::indicators::{TrendDirection, TrendIndicator};
use crate::models::series::Candle;

/// Percent move that adds one point of strength
const STRENGTH_STEP_PCT: f64 = 5.0;
const MAX_STRENGTH: f64 = 5.0;

/// Classify the change between the close `period - 1` bars ago and the
/// latest close. Moves beyond `threshold_pct` either way are a trend.
pub fn calculate_trend(
    candles: &[Candle],
    period: u32,
    threshold_pct: f64,
) -> Result<TrendIndicator, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod(period));
    }
    IndicatorError::check(candles.len(), period as usize)?;

    let first = candles[candles.len() - period as usize].close;
    let last = candles[candles.len() - 1].close;
    let change_pct = if first > 0.0 {
        (last - first) / first * 100.0
    } else {
        0.0
    };

    let direction = if change_pct > threshold_pct {
        TrendDirection::Bullish
    } else if change_pct < -threshold_pct {
        TrendDirection::Bearish
    } else {
        TrendDirection::Neutral
    };
    let strength = match direction {
        TrendDirection::Neutral => 0.0,
        _ => (change_pct.abs() / STRENGTH_STEP_PCT).min(MAX_STRENGTH),
    };

    Ok(TrendIndicator {
        direction,
        change_pct,
        strength,
        period,
    })
}

/// Calculate the 10-bar trend with a 3% threshold
pub fn calculate_trend_default(candles: &[Candle]) -> Result<TrendIndicator, IndicatorError> {
    calculate_trend(candles, 10, 3.0)
}
