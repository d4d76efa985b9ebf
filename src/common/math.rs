//! Numeric primitives shared by the indicators.
//!
//! Every function is pure and returns `None` when the input is too short
//! for the requested period.

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Simple moving average of the last `period` values
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    mean(&values[values.len() - period..])
}

/// EMA smoothing factor `2 / (period + 1)`
pub fn ema_alpha(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Next EMA value given the previous one
pub fn ema_from_previous(value: f64, previous: f64, period: usize) -> f64 {
    let alpha = ema_alpha(period);
    value * alpha + previous * (1.0 - alpha)
}

/// Full EMA series.
///
/// Seeded with the SMA of the first `period` values, so the output has
/// `values.len() - period + 1` entries and its first entry lines up with
/// `values[period - 1]`.
pub fn ema_series(values: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || values.len() < period {
        return None;
    }

    let seed = mean(&values[..period])?;
    let mut series = Vec::with_capacity(values.len() - period + 1);
    series.push(seed);

    let mut previous = seed;
    for &value in &values[period..] {
        previous = ema_from_previous(value, previous, period);
        series.push(previous);
    }

    Some(series)
}

/// Latest EMA value
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period)?.last().copied()
}

/// Wilder smoothing (RMA).
///
/// Seeded with the mean of the first `period` values, then
/// `avg = (avg * (period - 1) + value) / period`. Output is aligned the same
/// way as [`ema_series`].
pub fn wilder_series(values: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || values.len() < period {
        return None;
    }

    let p = period as f64;
    let seed = mean(&values[..period])?;
    let mut series = Vec::with_capacity(values.len() - period + 1);
    series.push(seed);

    let mut previous = seed;
    for &value in &values[period..] {
        previous = (previous * (p - 1.0) + value) / p;
        series.push(previous);
    }

    Some(series)
}

/// Latest Wilder-smoothed value
pub fn wilder(values: &[f64], period: usize) -> Option<f64> {
    wilder_series(values, period)?.last().copied()
}

/// True range of one bar against the previous close
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    let range = high - low;
    let up = (high - prev_close).abs();
    let down = (low - prev_close).abs();
    range.max(up).max(down)
}

/// Clamp into `[min, max]`, mapping NaN to `min`
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}
