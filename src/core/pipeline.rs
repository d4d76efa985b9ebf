//! Analysis pipeline: per-asset fan-out, then a single selection pass.
//!
//! Each asset goes fetch -> indicators -> levels -> sub-scores on its own
//! task. A failure becomes a `SkipReason` for that asset only. Selection
//! runs after every asset has finished.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{AnalysisConfig, ConfigError};
use crate::indicators::compute_bundle;
use crate::models::asset::AssetMeta;
use crate::models::report::{Report, SkipReason, SkippedAsset};
use crate::models::series::PriceSeries;
use crate::models::signal::AssetEvaluation;
use crate::services::market_data::MarketDataProvider;
use crate::signals::{CandidateSelector, FactorScorer, LevelCalculator, ReportAssembler};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Market data of one asset, as fetched
#[derive(Debug, Clone)]
pub struct AssetInput {
    pub meta: AssetMeta,
    pub series: PriceSeries,
}

pub type AssetOutcome = Result<AssetEvaluation, SkipReason>;

#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    config: Arc<AnalysisConfig>,
    scorer: FactorScorer,
    selector: CandidateSelector,
    levels: LevelCalculator,
    assembler: ReportAssembler,
}

impl AnalysisEngine {
    /// Validates the configuration; the engine refuses to exist otherwise
    pub fn new(config: AnalysisConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            scorer: FactorScorer::new(config.scoring.clone(), &config.levels),
            selector: CandidateSelector::new(&config)?,
            levels: LevelCalculator::new(config.levels)?,
            assembler: ReportAssembler::new(config.alert_score),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Indicators, trade levels and sub-scores for one asset
    pub fn evaluate_asset(&self, input: &AssetInput) -> AssetOutcome {
        let bundle = compute_bundle(&input.series, &self.config.indicators)?;
        let levels = self.levels.calculate(input.meta.current_price)?;
        let sub_scores = self.scorer.score(&bundle, &input.meta);

        Ok(AssetEvaluation {
            meta: input.meta.clone(),
            bundle,
            sub_scores,
            levels,
        })
    }

    /// Selection and report assembly over finished per-asset outcomes
    pub fn rank(&self, outcomes: Vec<(String, AssetOutcome)>, generated_at: DateTime<Utc>) -> Report {
        let evaluated = outcomes.len();
        let mut evaluations = Vec::new();
        let mut skipped = Vec::new();

        for (symbol, outcome) in outcomes {
            match outcome {
                Ok(evaluation) => evaluations.push(evaluation),
                Err(reason) => {
                    debug!(symbol = %symbol, reason = %reason, "Pipeline: skipping {}", symbol);
                    skipped.push(SkippedAsset { symbol, reason });
                }
            }
        }

        let candidates = evaluations
            .iter()
            .filter_map(|e| {
                self.selector.score_candidate(
                    &e.meta.symbol,
                    e.meta.market_cap,
                    e.meta.current_price,
                    e.sub_scores,
                )
            })
            .collect();
        let selection = self.selector.select(candidates);

        let report = self
            .assembler
            .assemble(generated_at, evaluated, selection, &evaluations, skipped);

        info!(
            evaluated = report.summary.evaluated,
            skipped = report.summary.skipped(),
            passed_filter = report.summary.passed_filter,
            passed_cutoff = report.summary.passed_cutoff,
            reported = report.summary.reported,
            "Pipeline: {} of {} assets reported",
            report.summary.reported,
            report.summary.evaluated
        );
        report
    }

    /// Synchronous run over already fetched inputs
    pub fn analyze(&self, inputs: &[AssetInput], generated_at: DateTime<Utc>) -> Report {
        let outcomes = inputs
            .iter()
            .map(|input| (input.meta.symbol.clone(), self.evaluate_asset(input)))
            .collect();
        self.rank(outcomes, generated_at)
    }

    async fn process_symbol(&self, provider: &dyn MarketDataProvider, symbol: &str) -> AssetOutcome {
        let meta = provider.fetch_asset_meta(symbol).await.map_err(|e| {
            warn!(symbol = %symbol, error = %e, "Pipeline: metadata unavailable for {}", symbol);
            e.skip_reason()
        })?;
        let series = provider
            .fetch_price_series(symbol, self.config.lookback_days)
            .await
            .map_err(|e| {
                warn!(symbol = %symbol, error = %e, "Pipeline: price series unavailable for {}", symbol);
                e.skip_reason()
            })?;

        let engine = self.clone();
        let input = AssetInput { meta, series };
        tokio::task::spawn_blocking(move || engine.evaluate_asset(&input))
            .await
            .unwrap_or_else(|e| {
                warn!(symbol = %symbol, error = %e, "Pipeline: evaluation task failed for {}", symbol);
                Err(SkipReason::InvalidData {
                    detail: format!("evaluation task failed: {}", e),
                })
            })
    }

    /// Run the whole pipeline over `universe`, stamping the report with
    /// `generated_at`. Scoring does not read the clock.
    pub async fn run_analysis_at(
        &self,
        provider: Arc<dyn MarketDataProvider>,
        universe: &BTreeSet<String>,
        generated_at: DateTime<Utc>,
    ) -> Report {
        info!(
            assets = universe.len(),
            concurrency = self.config.concurrency,
            "Pipeline: analysing {} assets",
            universe.len()
        );

        let market_context = match provider.fetch_market_context().await {
            Ok(context) => context,
            Err(e) => {
                warn!(error = %e, "Pipeline: market context unavailable");
                None
            }
        };

        let outcomes: Vec<(String, AssetOutcome)> = stream::iter(universe.iter().cloned())
            .map(|symbol| {
                let provider = provider.clone();
                async move {
                    let outcome = self.process_symbol(provider.as_ref(), &symbol).await;
                    (symbol, outcome)
                }
            })
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;

        let mut report = self.rank(outcomes, generated_at);
        report.market_context = market_context;
        report
    }

    pub async fn run_analysis(
        &self,
        provider: Arc<dyn MarketDataProvider>,
        universe: &BTreeSet<String>,
    ) -> Report {
        self.run_analysis_at(provider, universe, Utc::now()).await
    }
}

/// Single entry point: validate `config`, then analyse `universe`
pub async fn run_analysis(
    provider: Arc<dyn MarketDataProvider>,
    universe: &BTreeSet<String>,
    config: AnalysisConfig,
) -> Result<Report, AnalysisError> {
    let engine = AnalysisEngine::new(config)?;
    Ok(engine.run_analysis(provider, universe).await)
}
