//! RSI (Relative Strength Index) indicator

use crate::common::math;
use crate::indicators::IndicatorError;
use crate::models::indicators::RsiIndicator;
use crate::models::series::Candle;

/// Calculate Wilder's RSI
///
/// RSI = 100 - (100 / (1 + RS))
/// RS = Average Gain / Average Loss, both Wilder-smoothed over `period`
/// close-to-close changes. A zero average loss yields 100.
pub fn calculate_rsi(candles: &[Candle], period: u32) -> Result<RsiIndicator, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod(period));
    }
    let required = period as usize + 1;
    IndicatorError::check(candles.len(), required)?;

    let mut gains = Vec::with_capacity(candles.len() - 1);
    let mut losses = Vec::with_capacity(candles.len() - 1);
    for pair in candles.windows(2) {
        let change = pair[1].close - pair[0].close;
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let insufficient = IndicatorError::InsufficientData {
        required,
        available: candles.len(),
    };
    let avg_gain = math::wilder(&gains, period as usize).ok_or(insufficient.clone())?;
    let avg_loss = math::wilder(&losses, period as usize).ok_or(insufficient)?;

    let value = if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    };

    Ok(RsiIndicator { value, period })
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(candles: &[Candle]) -> Result<RsiIndicator, IndicatorError> {
    calculate_rsi(candles, 14)
}
