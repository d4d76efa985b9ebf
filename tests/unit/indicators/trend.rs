//! Unit tests for the short-term trend indicator

use swingscan::indicators::trend::{calculate_trend, calculate_trend_default};
use swingscan::indicators::IndicatorError;
use swingscan::models::indicators::TrendDirection;

use crate::support::{assert_close, candles_from_closes, linear_closes};

#[test]
fn test_trend_insufficient_data() {
    let candles = candles_from_closes(&linear_closes(9, 100.0, 1.0));
    assert_eq!(
        calculate_trend(&candles, 10, 3.0),
        Err(IndicatorError::InsufficientData {
            required: 10,
            available: 9
        })
    );
    assert_eq!(
        calculate_trend(&candles, 0, 3.0),
        Err(IndicatorError::InvalidPeriod(0))
    );
}

#[test]
fn test_rising_closes_are_bullish() {
    let candles = candles_from_closes(&linear_closes(10, 100.0, 1.0));
    let trend = calculate_trend(&candles, 10, 3.0).unwrap();
    assert_eq!(trend.direction, TrendDirection::Bullish);
    assert_close(trend.change_pct, 9.0, 1e-9);
    assert_close(trend.strength, 1.8, 1e-9);
    assert_eq!(trend.period, 10);
}

#[test]
fn test_falling_closes_are_bearish() {
    let candles = candles_from_closes(&linear_closes(10, 100.0, -1.0));
    let trend = calculate_trend(&candles, 10, 3.0).unwrap();
    assert_eq!(trend.direction, TrendDirection::Bearish);
    assert_close(trend.change_pct, -9.0, 1e-9);
    assert_close(trend.strength, 1.8, 1e-9);
}

#[test]
fn test_small_move_is_neutral() {
    let candles = candles_from_closes(&linear_closes(10, 100.0, 0.2));
    let trend = calculate_trend(&candles, 10, 3.0).unwrap();
    assert_eq!(trend.direction, TrendDirection::Neutral);
    assert_eq!(trend.strength, 0.0);
}

#[test]
fn test_strength_is_capped() {
    let candles = candles_from_closes(&linear_closes(10, 100.0, 20.0));
    let trend = calculate_trend(&candles, 10, 3.0).unwrap();
    assert_eq!(trend.direction, TrendDirection::Bullish);
    assert_eq!(trend.strength, 5.0);
}

#[test]
fn test_only_the_window_counts() {
    // A crash before the window does not make the last ten bars bearish.
    let mut closes = vec![500.0, 50.0];
    closes.extend(linear_closes(10, 100.0, 1.0));
    let candles = candles_from_closes(&closes);
    let trend = calculate_trend_default(&candles).unwrap();
    assert_eq!(trend.direction, TrendDirection::Bullish);
    assert_close(trend.change_pct, 9.0, 1e-9);
}

#[test]
fn test_threshold_is_configurable() {
    let candles = candles_from_closes(&linear_closes(10, 100.0, 1.0));
    let trend = calculate_trend(&candles, 10, 10.0).unwrap();
    assert_eq!(trend.direction, TrendDirection::Neutral);
}
