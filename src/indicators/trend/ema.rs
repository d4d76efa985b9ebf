//! EMA (Exponential Moving Average) indicator

use crate::common::math;
use crate::indicators::IndicatorError;
use crate::models::indicators::EmaIndicator;
use crate::models::series::Candle;

/// EMA series of closes, seeded with the SMA of the first `period` closes.
///
/// The first value lines up with `candles[period - 1]`.
pub fn ema_series(candles: &[Candle], period: u32) -> Result<Vec<f64>, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod(period));
    }
    IndicatorError::check(candles.len(), period as usize)?;

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    math::ema_series(&closes, period as usize).ok_or(IndicatorError::InsufficientData {
        required: period as usize,
        available: candles.len(),
    })
}

/// Calculate EMA for a specific period
pub fn calculate_ema(candles: &[Candle], period: u32) -> Result<EmaIndicator, IndicatorError> {
    let series = ema_series(candles, period)?;
    let value = series[series.len() - 1];
    let previous = series.len().checked_sub(2).map(|i| series[i]);

    Ok(EmaIndicator {
        value,
        previous,
        period,
    })
}

/// Bars since the fast EMA last crossed above the slow EMA, looking back at
/// most `lookback` bars. `None` if no bullish cross happened in that window
/// or the fast EMA is not above the slow one now.
pub fn bars_since_bullish_cross(
    candles: &[Candle],
    fast_period: u32,
    slow_period: u32,
    lookback: u32,
) -> Result<Option<usize>, IndicatorError> {
    let fast = ema_series(candles, fast_period)?;
    let slow = ema_series(candles, slow_period)?;

    // Align both series on the candles where the slow EMA is defined.
    let offset = fast.len() - slow.len();
    let spread: Vec<f64> = slow
        .iter()
        .enumerate()
        .map(|(i, s)| fast[i + offset] - s)
        .collect();

    let last = spread.len() - 1;
    if spread[last] <= 0.0 {
        return Ok(None);
    }

    let window = (lookback as usize).min(last);
    for bars_ago in 0..window {
        let now = spread[last - bars_ago];
        let before = spread[last - bars_ago - 1];
        if before <= 0.0 && now > 0.0 {
            return Ok(Some(bars_ago));
        }
    }
    Ok(None)
}
