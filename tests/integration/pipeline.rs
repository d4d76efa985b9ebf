//! End-to-end analysis runs over an in-memory universe

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use swingscan::config::{AnalysisConfig, ConfigError, FactorWeights};
use swingscan::core::pipeline::{run_analysis, AnalysisError};
use swingscan::models::asset::AssetMeta;
use swingscan::models::market::MarketContext;
use swingscan::models::report::SkipReason;
use swingscan::models::series::{Candle, PriceSeries};
use swingscan::services::{DataError, MarketDataProvider, StaticMarketDataProvider};

use crate::test_utils::{
    breakout_candles, engine, generated_at, scenario_inputs, scenario_provider, scenario_universe,
    ts, BREAKOUT_PRICE,
};

fn reason_of<'a>(report: &'a swingscan::Report, symbol: &str) -> &'a SkipReason {
    &report
        .skipped
        .iter()
        .find(|s| s.symbol == symbol)
        .unwrap_or_else(|| panic!("{} not skipped", symbol))
        .reason
}

#[tokio::test]
async fn full_run_reports_only_qualifying_assets() {
    let engine = engine(AnalysisConfig::default());
    let report = engine
        .run_analysis_at(Arc::new(scenario_provider()), &scenario_universe(), generated_at())
        .await;

    assert_eq!(report.generated_at, generated_at());
    assert_eq!(report.entries.len(), 1);

    let top = &report.entries[0];
    assert_eq!(top.rank, 1);
    assert_eq!(top.candidate.symbol, "BIG");
    assert_eq!(top.name, "Big Coin");
    assert_eq!(top.candidate.market_cap_multiplier, 1.10);
    assert!((top.candidate.final_score - 8.0255).abs() < 1e-3);
    assert!(!top.high_score);

    let sub = top.candidate.sub_scores;
    assert_eq!(sub.momentum, 8.0);
    assert_eq!(sub.volume, 10.0);
    assert_eq!(sub.technical, 2.0);
    assert!(sub.risk > 9.9 && sub.risk <= 10.0);

    let levels = &top.levels;
    assert_eq!(levels.entry, BREAKOUT_PRICE);
    assert!(levels.stop_loss < levels.entry);
    assert!(levels.target_1 < levels.target_2);

    let summary = &report.summary;
    assert_eq!(summary.evaluated, 7);
    assert_eq!(summary.passed_filter, 3);
    assert_eq!(summary.passed_cutoff, 1);
    assert_eq!(summary.reported, 1);
    assert_eq!(summary.data_unavailable, 1);
    assert_eq!(summary.insufficient_data, 1);
    assert_eq!(summary.invalid_price, 1);
    assert_eq!(summary.skipped(), 3);
}

#[tokio::test]
async fn failures_are_isolated_per_asset() {
    let engine = engine(AnalysisConfig::default());
    let report = engine
        .run_analysis_at(Arc::new(scenario_provider()), &scenario_universe(), generated_at())
        .await;

    assert!(matches!(
        reason_of(&report, "MISSING"),
        SkipReason::DataUnavailable { .. }
    ));
    assert_eq!(
        reason_of(&report, "SHORT"),
        &SkipReason::InsufficientData {
            required: 35,
            available: 20
        }
    );
    assert_eq!(
        reason_of(&report, "ZERO"),
        &SkipReason::InvalidPrice { price: 0.0 }
    );

    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(skipped, vec!["MISSING", "SHORT", "ZERO"]);
}

#[tokio::test]
async fn invalid_series_is_skipped_as_invalid_data() {
    let mut candles = breakout_candles();
    candles.swap(10, 11);
    let provider = StaticMarketDataProvider::new()
        .with_asset(AssetMeta::new("BAD", 20e9, BREAKOUT_PRICE), candles)
        .with_asset(AssetMeta::new("BIG", 20e9, BREAKOUT_PRICE), breakout_candles());
    let universe = ["BAD", "BIG"].iter().map(|s| s.to_string()).collect();

    let report = engine(AnalysisConfig::default())
        .run_analysis_at(Arc::new(provider), &universe, generated_at())
        .await;

    assert!(matches!(
        reason_of(&report, "BAD"),
        SkipReason::InvalidData { .. }
    ));
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].candidate.symbol, "BIG");
}

#[tokio::test]
async fn lower_cutoff_ranks_by_tier() {
    let config = AnalysisConfig {
        min_score: 7.0,
        ..AnalysisConfig::default()
    };
    let report = engine(config)
        .run_analysis_at(Arc::new(scenario_provider()), &scenario_universe(), generated_at())
        .await;

    let symbols: Vec<&str> = report
        .entries
        .iter()
        .map(|e| e.candidate.symbol.as_str())
        .collect();
    assert_eq!(symbols, vec!["BIG", "MID"]);
    assert_eq!(report.entries[1].rank, 2);
    assert_eq!(report.summary.passed_cutoff, 2);
}

#[tokio::test]
async fn cap_limits_reported_entries() {
    let config = AnalysisConfig {
        min_score: 0.0,
        max_candidates: 2,
        ..AnalysisConfig::default()
    };
    let report = engine(config)
        .run_analysis_at(Arc::new(scenario_provider()), &scenario_universe(), generated_at())
        .await;

    assert_eq!(report.summary.passed_cutoff, 3);
    assert_eq!(report.entries.len(), 2);
}

#[tokio::test]
async fn empty_result_is_a_valid_report() {
    let config = AnalysisConfig {
        min_score: 9.5,
        ..AnalysisConfig::default()
    };
    let report = engine(config)
        .run_analysis_at(Arc::new(scenario_provider()), &scenario_universe(), generated_at())
        .await;

    assert!(report.is_empty());
    assert_eq!(report.summary.passed_filter, 3);
    assert_eq!(report.summary.passed_cutoff, 0);
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let engine = engine(AnalysisConfig::default());
    let provider = Arc::new(scenario_provider());
    let universe = scenario_universe();

    let first = engine
        .run_analysis_at(provider.clone(), &universe, generated_at())
        .await;
    let second = engine
        .run_analysis_at(provider, &universe, generated_at())
        .await;

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn concurrency_does_not_change_the_report() {
    let universe = scenario_universe();
    let serial = engine(AnalysisConfig {
        concurrency: 1,
        ..AnalysisConfig::default()
    })
    .run_analysis_at(Arc::new(scenario_provider()), &universe, generated_at())
    .await;
    let parallel = engine(AnalysisConfig {
        concurrency: 16,
        ..AnalysisConfig::default()
    })
    .run_analysis_at(Arc::new(scenario_provider()), &universe, generated_at())
    .await;

    assert_eq!(serial, parallel);
}

#[tokio::test]
async fn synchronous_path_matches_async_run() {
    let config = AnalysisConfig {
        min_score: 0.0,
        ..AnalysisConfig::default()
    };
    let engine = engine(config);
    let sync_report = engine.analyze(&scenario_inputs(), generated_at());

    let universe = ["BIG", "MID", "LOW"].iter().map(|s| s.to_string()).collect();
    let async_report = engine
        .run_analysis_at(Arc::new(scenario_provider()), &universe, generated_at())
        .await;

    let scores = |r: &swingscan::Report| -> Vec<(String, f64)> {
        r.entries
            .iter()
            .map(|e| (e.candidate.symbol.clone(), e.candidate.final_score))
            .collect()
    };
    assert_eq!(scores(&sync_report), scores(&async_report));
    assert_eq!(sync_report.summary, async_report.summary);
}

#[tokio::test]
async fn volume_falls_back_to_turnover_without_series_volume() {
    let candles: Vec<Candle> = breakout_candles()
        .into_iter()
        .map(|c| Candle { volume: 0.0, ..c })
        .collect();
    let provider = StaticMarketDataProvider::new().with_asset(
        AssetMeta::new("BIG", 20e9, BREAKOUT_PRICE).with_total_volume(75_000_000.0),
        candles,
    );
    let universe = ["BIG".to_string()].into_iter().collect();

    let report = engine(AnalysisConfig {
        min_score: 0.0,
        ..AnalysisConfig::default()
    })
    .run_analysis_at(Arc::new(provider), &universe, generated_at())
    .await;

    assert_eq!(report.entries[0].candidate.sub_scores.volume, 10.0);
    assert_eq!(report.entries[0].indicators.volume.volume_ma, None);
}

#[tokio::test]
async fn invalid_config_is_fatal() {
    let config = AnalysisConfig {
        weights: FactorWeights {
            momentum: 0.9,
            volume: 0.9,
            technical: 0.0,
            risk: 0.0,
        },
        ..AnalysisConfig::default()
    };
    let result = run_analysis(Arc::new(scenario_provider()), &scenario_universe(), config).await;
    assert!(matches!(result, Err(AnalysisError::Config(_))));
}

#[tokio::test]
async fn single_entry_point_runs_with_defaults() {
    let report = run_analysis(
        Arc::new(scenario_provider()),
        &scenario_universe(),
        AnalysisConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.entries.len(), 1);
    assert!(report.generated_at > ts(0));
}

#[tokio::test]
async fn market_cap_filter_below_tiers_is_fatal() {
    let config = AnalysisConfig {
        min_market_cap: 50_000_000.0,
        ..AnalysisConfig::default()
    };
    let result = run_analysis(Arc::new(scenario_provider()), &scenario_universe(), config).await;
    assert!(matches!(
        result,
        Err(AnalysisError::Config(ConfigError::Tiers(_)))
    ));
}

fn market_context() -> MarketContext {
    MarketContext {
        btc_dominance: 54.2,
        total_market_cap: 2.4e12,
        total_volume_24h: 9.1e10,
        active_cryptocurrencies: 12_000,
    }
}

#[tokio::test]
async fn market_context_is_attached_to_the_report() {
    let provider = scenario_provider().with_market_context(market_context());
    let report = engine(AnalysisConfig::default())
        .run_analysis_at(Arc::new(provider), &scenario_universe(), generated_at())
        .await;
    assert_eq!(report.market_context, Some(market_context()));
    assert_eq!(report.entries.len(), 1);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["market_context"]["btc_dominance"], 54.2);
}

/// Serves the scenario but cannot produce market-wide figures
struct NoContextProvider(StaticMarketDataProvider);

#[async_trait]
impl MarketDataProvider for NoContextProvider {
    async fn universe(&self) -> Result<Vec<String>, DataError> {
        self.0.universe().await
    }

    async fn fetch_price_series(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<PriceSeries, DataError> {
        self.0.fetch_price_series(symbol, lookback_days).await
    }

    async fn fetch_asset_meta(&self, symbol: &str) -> Result<AssetMeta, DataError> {
        self.0.fetch_asset_meta(symbol).await
    }

    async fn fetch_market_context(&self) -> Result<Option<MarketContext>, DataError> {
        Err(DataError::Status { status: 503 })
    }
}

#[tokio::test]
async fn market_context_failure_leaves_it_empty() {
    let provider = NoContextProvider(scenario_provider());
    let universe: BTreeSet<String> = scenario_universe();
    let report = engine(AnalysisConfig::default())
        .run_analysis_at(Arc::new(provider), &universe, generated_at())
        .await;

    assert_eq!(report.market_context, None);
    assert_eq!(report.entries.len(), 1);
    assert!(serde_json::to_value(&report)
        .unwrap()
        .get("market_context")
        .is_none());
}
