//! Unit tests for the factor scorer

use swingscan::config::{LevelConfig, ScoringPolicy};
use swingscan::models::asset::AssetMeta;
use swingscan::models::indicators::{
    AtrIndicator, EmaIndicator, IndicatorBundle, MacdIndicator, RsiIndicator, TrendDirection,
    TrendIndicator, VolumeIndicator,
};
use swingscan::signals::FactorScorer;

use crate::support::assert_close;

fn scorer() -> FactorScorer {
    FactorScorer::new(ScoringPolicy::default(), &LevelConfig::default())
}

/// Neutral bundle at price 100: bearish EMAs, flat MACD, RSI 50, ATR 1%
fn bundle() -> IndicatorBundle {
    IndicatorBundle {
        symbol: "TEST".to_string(),
        close: 100.0,
        ema_fast: EmaIndicator {
            value: 99.0,
            previous: Some(99.0),
            period: 7,
        },
        ema_slow: EmaIndicator {
            value: 101.0,
            previous: Some(101.0),
            period: 25,
        },
        rsi: RsiIndicator {
            value: 50.0,
            period: 14,
        },
        macd: MacdIndicator {
            macd: 0.0,
            signal: 0.0,
            histogram: 0.0,
            previous_histogram: 0.0,
            period: (12, 26, 9),
        },
        atr: AtrIndicator {
            value: 1.0,
            period: 14,
        },
        volume: VolumeIndicator {
            volume: 1000.0,
            volume_ma: Some(1000.0),
            volume_ma_period: 20,
        },
        trend: TrendIndicator {
            direction: TrendDirection::Neutral,
            change_pct: 0.0,
            strength: 0.0,
            period: 10,
        },
        bars_since_cross: None,
    }
}

fn meta() -> AssetMeta {
    AssetMeta::new("TEST", 5e9, 100.0)
}

#[test]
fn test_momentum_base_only() {
    assert_eq!(scorer().momentum_score(&bundle(), 100.0), 2.0);
}

#[test]
fn test_momentum_established_uptrend() {
    let mut b = bundle();
    b.ema_fast.value = 98.0;
    b.ema_slow.value = 95.0;
    b.macd.histogram = 0.5;
    b.macd.previous_histogram = 0.3;
    // base 2 + cross 2 + aligned 3 + histogram 1
    assert_eq!(scorer().momentum_score(&b, 100.0), 8.0);
}

#[test]
fn test_momentum_fresh_signals_clip_at_ten() {
    let mut b = bundle();
    b.ema_fast.value = 98.0;
    b.ema_slow.value = 95.0;
    b.bars_since_cross = Some(1);
    b.macd.histogram = 0.5;
    b.macd.previous_histogram = -0.1;
    // 2 + 2 + 1 + 3 + 1 + 1 = 10
    assert_eq!(scorer().momentum_score(&b, 100.0), 10.0);

    let generous = ScoringPolicy {
        momentum_base: 5.0,
        ..ScoringPolicy::default()
    };
    let scorer = FactorScorer::new(generous, &LevelConfig::default());
    assert_eq!(scorer.momentum_score(&b, 100.0), 10.0);
}

#[test]
fn test_momentum_not_aligned_below_fast_ema() {
    let mut b = bundle();
    b.ema_fast.value = 101.0;
    b.ema_slow.value = 95.0;
    assert_eq!(scorer().momentum_score(&b, 100.0), 4.0);
}

#[test]
fn test_volume_ratio_scaling() {
    let mut b = bundle();
    assert_eq!(scorer().volume_score(&b, &meta()), 5.0);

    b.volume.volume = 3000.0;
    assert_eq!(scorer().volume_score(&b, &meta()), 10.0);

    b.volume.volume = 0.0;
    assert_eq!(scorer().volume_score(&b, &meta()), 0.0);
}

#[test]
fn test_volume_turnover_fallback() {
    let mut b = bundle();
    b.volume.volume_ma = None;

    let quiet = meta().with_total_volume(5_000_000.0);
    assert_eq!(scorer().volume_score(&b, &quiet), 4.0);

    let active = meta().with_total_volume(20_000_000.0);
    assert_eq!(scorer().volume_score(&b, &active), 7.0);

    let busy = meta().with_total_volume(80_000_000.0);
    assert_eq!(scorer().volume_score(&b, &busy), 10.0);
}

#[test]
fn test_technical_rsi_bands() {
    let s = scorer();
    assert_eq!(s.technical_score(50.0), 10.0);
    assert_eq!(s.technical_score(40.0), 10.0);
    assert_eq!(s.technical_score(65.0), 10.0);
    assert_close(s.technical_score(35.0), 6.0, 1e-12);
    assert_close(s.technical_score(67.5), 6.0, 1e-12);
    assert_eq!(s.technical_score(30.0), 2.0);
    assert_eq!(s.technical_score(10.0), 2.0);
    assert_eq!(s.technical_score(70.0), 2.0);
    assert_eq!(s.technical_score(100.0), 2.0);
}

#[test]
fn test_risk_penalizes_volatility() {
    let s = scorer();
    let mut b = bundle();
    assert_close(s.risk_score(&b, 100.0), 8.8, 1e-12);

    // ATR 3% is wider than the 2.5% stop: extra penalty
    b.atr.value = 3.0;
    assert_close(s.risk_score(&b, 100.0), 10.0 - 3.6 - 3.0, 1e-12);

    b.atr.value = 20.0;
    assert_eq!(s.risk_score(&b, 100.0), 0.0);
}

#[test]
fn test_scores_always_in_range() {
    let s = scorer();
    for rsi in [0.0, 15.0, 39.9, 65.1, 99.0, f64::NAN] {
        let score = s.technical_score(rsi);
        assert!((0.0..=10.0).contains(&score), "rsi {} gave {}", rsi, score);
    }

    let mut b = bundle();
    b.volume.volume = 1e12;
    b.atr.value = 1e6;
    let sub = s.score(&b, &meta());
    for value in [sub.momentum, sub.volume, sub.technical, sub.risk] {
        assert!((0.0..=10.0).contains(&value));
    }
}
