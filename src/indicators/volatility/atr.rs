//! ATR (Average True Range) indicator

use crate::common::math;
use crate::indicators::IndicatorError;
use crate::models::indicators::AtrIndicator;
use crate::models::series::Candle;

/// Calculate ATR with Wilder smoothing of the true range
pub fn calculate_atr(candles: &[Candle], period: u32) -> Result<AtrIndicator, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod(period));
    }
    let required = period as usize + 1;
    IndicatorError::check(candles.len(), required)?;

    let tr_values: Vec<f64> = candles
        .windows(2)
        .map(|pair| math::true_range(pair[1].high, pair[1].low, pair[0].close))
        .collect();

    let value = math::wilder(&tr_values, period as usize).ok_or(
        IndicatorError::InsufficientData {
            required,
            available: candles.len(),
        },
    )?;

    Ok(AtrIndicator { value, period })
}

/// Calculate ATR with default period (14)
pub fn calculate_atr_default(candles: &[Candle]) -> Result<AtrIndicator, IndicatorError> {
    calculate_atr(candles, 14)
}
