//! Fixtures shared by the integration tests

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use swingscan::config::AnalysisConfig;
use swingscan::core::pipeline::{AnalysisEngine, AssetInput};
use swingscan::core::runtime::AnalysisRuntime;
use swingscan::metrics::Metrics;
use swingscan::models::asset::AssetMeta;
use swingscan::models::series::{Candle, PriceSeries};
use swingscan::services::{
    DataError, LogNotifier, MarketDataProvider, Notifier, StaticMarketDataProvider,
};
use tokio::sync::Notify;

pub const BASE_TS: i64 = 1_704_067_200;

pub fn ts(index: usize) -> DateTime<Utc> {
    DateTime::from_timestamp(BASE_TS + index as i64 * 86_400, 0).unwrap()
}

pub fn generated_at() -> DateTime<Utc> {
    DateTime::from_timestamp(1_735_720_200, 0).unwrap()
}

/// 60 daily candles: a steady climb of one point a bar from 10 000, then
/// three bars of five points, with a volume spike on the last bar.
///
/// Scores momentum 8, volume 10, technical 2 (RSI 100) and risk just under
/// 10, for a weighted score of about 7.30 before the tier multiplier.
pub fn breakout_candles() -> Vec<Candle> {
    let mut closes: Vec<f64> = (0..57).map(|i| 10_000.0 + i as f64).collect();
    let last = closes[56];
    closes.extend([last + 5.0, last + 10.0, last + 15.0]);

    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let volume = if i == closes.len() - 1 { 5000.0 } else { 1000.0 };
            Candle::new(close, close + 0.5, close - 0.5, close, volume, ts(i))
        })
        .collect()
}

pub const BREAKOUT_PRICE: f64 = 10_071.0;

/// Universe exercising every outcome of one run:
///
/// - BIG, MID, LOW: same breakout, market caps in each tier
/// - SMALL: below the market-cap floor
/// - SHORT: 20 samples only
/// - ZERO: no usable entry price
/// - MISSING (universe only): no data at all
pub fn scenario_provider() -> StaticMarketDataProvider {
    let candles = breakout_candles();
    StaticMarketDataProvider::new()
        .with_asset(
            AssetMeta::new("BIG", 20e9, BREAKOUT_PRICE).with_name("Big Coin"),
            candles.clone(),
        )
        .with_asset(AssetMeta::new("MID", 5e9, BREAKOUT_PRICE), candles.clone())
        .with_asset(AssetMeta::new("LOW", 5e8, BREAKOUT_PRICE), candles.clone())
        .with_asset(AssetMeta::new("SMALL", 5e7, BREAKOUT_PRICE), candles.clone())
        .with_asset(
            AssetMeta::new("SHORT", 20e9, BREAKOUT_PRICE),
            candles[..20].to_vec(),
        )
        .with_asset(AssetMeta::new("ZERO", 20e9, 0.0), candles)
}

pub fn scenario_universe() -> BTreeSet<String> {
    ["BIG", "MID", "LOW", "SMALL", "SHORT", "ZERO", "MISSING"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn scenario_inputs() -> Vec<AssetInput> {
    let candles = breakout_candles();
    ["BIG", "MID", "LOW"]
        .iter()
        .zip([20e9, 5e9, 5e8])
        .map(|(symbol, cap)| AssetInput {
            meta: AssetMeta::new(*symbol, cap, BREAKOUT_PRICE),
            series: PriceSeries::new(*symbol, candles.clone()).unwrap(),
        })
        .collect()
}

pub fn engine(config: AnalysisConfig) -> AnalysisEngine {
    AnalysisEngine::new(config).expect("valid config")
}

/// Provider whose `universe()` blocks until released
pub struct GatedProvider {
    inner: StaticMarketDataProvider,
    gate: Arc<Notify>,
}

impl GatedProvider {
    pub fn new(inner: StaticMarketDataProvider) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        (
            Self {
                inner,
                gate: gate.clone(),
            },
            gate,
        )
    }
}

#[async_trait]
impl MarketDataProvider for GatedProvider {
    async fn universe(&self) -> Result<Vec<String>, DataError> {
        self.gate.notified().await;
        self.inner.universe().await
    }

    async fn fetch_price_series(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<PriceSeries, DataError> {
        self.inner.fetch_price_series(symbol, lookback_days).await
    }

    async fn fetch_asset_meta(&self, symbol: &str) -> Result<AssetMeta, DataError> {
        self.inner.fetch_asset_meta(symbol).await
    }
}

/// Lists symbols but has no data for any of them
pub struct NoDataProvider(pub Vec<String>);

#[async_trait]
impl MarketDataProvider for NoDataProvider {
    async fn universe(&self) -> Result<Vec<String>, DataError> {
        Ok(self.0.clone())
    }

    async fn fetch_price_series(
        &self,
        symbol: &str,
        _lookback_days: u32,
    ) -> Result<PriceSeries, DataError> {
        Err(DataError::unavailable(symbol, "upstream down"))
    }

    async fn fetch_asset_meta(&self, symbol: &str) -> Result<AssetMeta, DataError> {
        Err(DataError::unavailable(symbol, "upstream down"))
    }
}

pub fn runtime_with(
    provider: Arc<dyn MarketDataProvider>,
    notifier: Arc<dyn Notifier>,
) -> (Arc<AnalysisRuntime>, Arc<Metrics>) {
    let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
    let runtime = Arc::new(AnalysisRuntime::new(
        engine(AnalysisConfig::default()),
        provider,
        notifier,
        metrics.clone(),
    ));
    (runtime, metrics)
}

pub fn scenario_runtime() -> (Arc<AnalysisRuntime>, Arc<Metrics>) {
    runtime_with(Arc::new(scenario_provider()), Arc::new(LogNotifier))
}
