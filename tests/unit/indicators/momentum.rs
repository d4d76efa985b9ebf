//! Unit tests for RSI and MACD

use swingscan::indicators::momentum::{
    calculate_macd, calculate_macd_default, calculate_rsi, calculate_rsi_default,
};
use swingscan::indicators::IndicatorError;

use crate::support::{
    assert_close, candles_from_closes, linear_closes, random_walk_closes, zigzag_closes,
};

#[test]
fn test_rsi_insufficient_data() {
    let candles = candles_from_closes(&linear_closes(14, 100.0, 1.0));
    assert_eq!(
        calculate_rsi(&candles, 14),
        Err(IndicatorError::InsufficientData {
            required: 15,
            available: 14
        })
    );
}

#[test]
fn test_rsi_only_gains_is_100() {
    let candles = candles_from_closes(&linear_closes(20, 100.0, 1.0));
    assert_eq!(calculate_rsi(&candles, 14).unwrap().value, 100.0);
}

#[test]
fn test_rsi_only_losses_is_0() {
    let candles = candles_from_closes(&linear_closes(20, 100.0, -1.0));
    assert_eq!(calculate_rsi(&candles, 14).unwrap().value, 0.0);
}

#[test]
fn test_rsi_flat_closes_is_100() {
    let candles = candles_from_closes(&[100.0; 30]);
    assert_eq!(calculate_rsi(&candles, 14).unwrap().value, 100.0);
}

#[test]
fn test_rsi_stays_in_range_on_oscillating_closes() {
    for closes in [zigzag_closes(80, 100.0), random_walk_closes(80, 7)] {
        for end in 15..=closes.len() {
            let rsi = calculate_rsi(&candles_from_closes(&closes[..end]), 14).unwrap();
            assert!(
                (0.0..=100.0).contains(&rsi.value),
                "RSI {} out of range at {}",
                rsi.value,
                end
            );
        }
    }
}

#[test]
fn test_rsi_reference_values() {
    let closes = [
        44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03, 45.61,
        46.28, 46.28,
    ];
    let rsi = calculate_rsi(&candles_from_closes(&closes), 14).unwrap();
    assert_eq!(rsi.period, 14);
    assert_close(rsi.value, 70.464135, 1e-5);
    assert_eq!(calculate_rsi_default(&candles_from_closes(&closes)), Ok(rsi));
}

#[test]
fn test_macd_requires_slow_plus_signal_samples() {
    let candles = candles_from_closes(&linear_closes(34, 100.0, 1.0));
    assert_eq!(
        calculate_macd_default(&candles),
        Err(IndicatorError::InsufficientData {
            required: 35,
            available: 34
        })
    );
    let candles = candles_from_closes(&linear_closes(35, 100.0, 1.0));
    assert!(calculate_macd_default(&candles).is_ok());
}

#[test]
fn test_macd_flat_market_is_zero() {
    let candles = candles_from_closes(&[100.0; 40]);
    let macd = calculate_macd(&candles, 12, 26, 9).unwrap();
    assert_close(macd.macd, 0.0, 1e-9);
    assert_close(macd.signal, 0.0, 1e-9);
    assert_close(macd.histogram, 0.0, 1e-9);
    assert_eq!(macd.period, (12, 26, 9));
}

#[test]
fn test_macd_linear_trend_settles() {
    // Both EMAs lag a unit-step line by a constant, so the MACD line is flat.
    let candles = candles_from_closes(&linear_closes(40, 100.0, 1.0));
    let macd = calculate_macd(&candles, 12, 26, 9).unwrap();
    assert_close(macd.macd, 7.0, 1e-9);
    assert_close(macd.signal, 7.0, 1e-9);
    assert_close(macd.histogram, 0.0, 1e-9);
}

#[test]
fn test_macd_histogram_turns_positive() {
    let mut closes = linear_closes(40, 200.0, -1.0);
    closes.extend([155.0, 150.0, 145.0]);
    let before = calculate_macd_default(&candles_from_closes(&closes)).unwrap();
    assert!(before.histogram < 0.0);
    assert!(!before.turned_positive());

    closes.push(175.0);
    let after = calculate_macd_default(&candles_from_closes(&closes)).unwrap();
    assert!(after.histogram > 0.0);
    assert_close(after.previous_histogram, before.histogram, 1e-12);
    assert!(after.turned_positive());
}
