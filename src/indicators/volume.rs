//! Relative volume

use crate::common::math;
use crate::indicators::IndicatorError;
use crate::models::indicators::VolumeIndicator;
use crate::models::series::Candle;

/// Latest volume and the mean of the `lookback` volumes before it.
///
/// `volume_ma` is `None` when that baseline is zero, which is the case for
/// sources that do not report volume.
pub fn calculate_volume(
    candles: &[Candle],
    lookback: u32,
) -> Result<VolumeIndicator, IndicatorError> {
    if lookback == 0 {
        return Err(IndicatorError::InvalidPeriod(lookback));
    }
    IndicatorError::check(candles.len(), lookback as usize + 1)?;

    let last = candles.len() - 1;
    let baseline: Vec<f64> = candles[last - lookback as usize..last]
        .iter()
        .map(|c| c.volume)
        .collect();
    let volume_ma = math::mean(&baseline).filter(|ma| *ma > 0.0);

    Ok(VolumeIndicator {
        volume: candles[last].volume,
        volume_ma,
        volume_ma_period: lookback,
    })
}
