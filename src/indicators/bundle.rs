//! Per-asset indicator snapshot

use crate::config::IndicatorParams;
use crate::indicators::momentum::{calculate_macd, calculate_rsi};
use crate::indicators::trend::{bars_since_bullish_cross, calculate_ema, calculate_trend};
use crate::indicators::volatility::calculate_atr;
use crate::indicators::volume::calculate_volume;
use crate::indicators::IndicatorError;
use crate::models::indicators::IndicatorBundle;
use crate::models::series::PriceSeries;

/// Compute every indicator the scorer needs for one asset.
///
/// Fails up front with `InsufficientData` when the series is shorter than
/// the slowest indicator requires.
pub fn compute_bundle(
    series: &PriceSeries,
    params: &IndicatorParams,
) -> Result<IndicatorBundle, IndicatorError> {
    IndicatorError::check(series.len(), params.min_samples())?;

    let candles = series.candles();
    let close = candles[candles.len() - 1].close;

    Ok(IndicatorBundle {
        symbol: series.symbol().to_string(),
        close,
        ema_fast: calculate_ema(candles, params.ema_fast)?,
        ema_slow: calculate_ema(candles, params.ema_slow)?,
        rsi: calculate_rsi(candles, params.rsi_period)?,
        macd: calculate_macd(candles, params.macd_fast, params.macd_slow, params.macd_signal)?,
        atr: calculate_atr(candles, params.atr_period)?,
        volume: calculate_volume(candles, params.volume_lookback)?,
        trend: calculate_trend(candles, params.trend_lookback, params.trend_threshold_pct)?,
        bars_since_cross: bars_since_bullish_cross(
            candles,
            params.ema_fast,
            params.ema_slow,
            params.cross_lookback,
        )?,
    })
}
