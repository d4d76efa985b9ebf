//! MACD (Moving Average Convergence Divergence) indicator

use crate::common::math;
use crate::indicators::trend::ema_series;
use crate::indicators::IndicatorError;
use crate::models::indicators::MacdIndicator;
use crate::models::series::Candle;

/// Calculate MACD indicator
///
/// MACD = EMA(fast) - EMA(slow)
/// Signal = EMA(signal) of the MACD line
/// Histogram = MACD - Signal
///
/// Needs `slow + signal` candles so that the histogram of the previous bar
/// is defined as well.
pub fn calculate_macd(
    candles: &[Candle],
    fast_period: u32,
    slow_period: u32,
    signal_period: u32,
) -> Result<MacdIndicator, IndicatorError> {
    if signal_period == 0 {
        return Err(IndicatorError::InvalidPeriod(signal_period));
    }
    let required = slow_period as usize + signal_period as usize;
    IndicatorError::check(candles.len(), required)?;

    let fast = ema_series(candles, fast_period)?;
    let slow = ema_series(candles, slow_period)?;

    // The slow series starts later; align on its first value.
    let offset = fast.len().saturating_sub(slow.len());
    let macd_line: Vec<f64> = slow
        .iter()
        .enumerate()
        .map(|(i, s)| fast[i + offset] - s)
        .collect();

    let signal_line = math::ema_series(&macd_line, signal_period as usize).ok_or(
        IndicatorError::InsufficientData {
            required,
            available: candles.len(),
        },
    )?;

    let n_macd = macd_line.len();
    let n_signal = signal_line.len();
    let macd = macd_line[n_macd - 1];
    let signal = signal_line[n_signal - 1];
    let previous_histogram = macd_line[n_macd - 2] - signal_line[n_signal - 2];

    Ok(MacdIndicator {
        macd,
        signal,
        histogram: macd - signal,
        previous_histogram,
        period: (fast_period, slow_period, signal_period),
    })
}

/// Calculate MACD with default periods (12, 26, 9)
pub fn calculate_macd_default(candles: &[Candle]) -> Result<MacdIndicator, IndicatorError> {
    calculate_macd(candles, 12, 26, 9)
}
