//! Analysis runtime: one run at a time, last status kept for the API

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::core::pipeline::AnalysisEngine;
use crate::metrics::Metrics;
use crate::models::report::Report;
use crate::services::error::{DataError, NotifyError};
use crate::services::market_data::MarketDataProvider;
use crate::services::notifier::Notifier;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("an analysis run is already in progress")]
    AlreadyRunning,
    #[error("failed to load the asset universe: {0}")]
    Universe(#[from] DataError),
    #[error("the asset universe is empty")]
    EmptyUniverse,
    #[error("no market data for any of the {0} assets")]
    NoData(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    NeverRun,
    Running,
    Success,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct LastRun {
    pub time: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub signals: usize,
    pub duration_seconds: Option<f64>,
}

impl Default for LastRun {
    fn default() -> Self {
        Self {
            time: None,
            status: RunStatus::NeverRun,
            signals: 0,
            duration_seconds: None,
        }
    }
}

pub struct AnalysisRuntime {
    engine: AnalysisEngine,
    provider: Arc<dyn MarketDataProvider>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<Metrics>,
    last_run: RwLock<LastRun>,
    latest_report: RwLock<Option<Arc<Report>>>,
    run_lock: Mutex<()>,
}

impl AnalysisRuntime {
    pub fn new(
        engine: AnalysisEngine,
        provider: Arc<dyn MarketDataProvider>,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            engine,
            provider,
            notifier,
            metrics,
            last_run: RwLock::new(LastRun::default()),
            latest_report: RwLock::new(None),
            run_lock: Mutex::new(()),
        }
    }

    pub fn engine(&self) -> &AnalysisEngine {
        &self.engine
    }

    /// Fetch the universe, analyse it and deliver the report.
    ///
    /// Concurrent callers get `AlreadyRunning` instead of queueing. A
    /// notification failure is logged but does not fail the run.
    pub async fn run_once(&self) -> Result<Arc<Report>, RunError> {
        let _guard = self.run_lock.try_lock().map_err(|_| RunError::AlreadyRunning)?;

        let started = Instant::now();
        let started_at = Utc::now();
        {
            let mut last = self.last_run.write().await;
            last.time = Some(started_at);
            last.status = RunStatus::Running;
        }
        info!("AnalysisRuntime: starting analysis run");

        let result = self.execute().await;
        let duration = started.elapsed().as_secs_f64();

        let mut last = self.last_run.write().await;
        last.duration_seconds = Some(duration);
        match result {
            Ok(report) => {
                self.metrics.record_report(&report, duration);
                last.status = RunStatus::Success;
                last.signals = report.summary.reported;
                *self.latest_report.write().await = Some(report.clone());

                info!(
                    signals = report.summary.reported,
                    duration_seconds = duration,
                    "AnalysisRuntime: run finished with {} signals in {:.1}s",
                    report.summary.reported,
                    duration
                );
                Ok(report)
            }
            Err(e) => {
                self.metrics.analysis_failures_total.inc();
                last.status = RunStatus::Failed {
                    reason: e.to_string(),
                };
                last.signals = 0;
                error!(error = %e, "AnalysisRuntime: run failed");
                Err(e)
            }
        }
    }

    async fn execute(&self) -> Result<Arc<Report>, RunError> {
        let universe: BTreeSet<String> = self.provider.universe().await?.into_iter().collect();
        if universe.is_empty() {
            return Err(RunError::EmptyUniverse);
        }

        let report = Arc::new(
            self.engine
                .run_analysis(self.provider.clone(), &universe)
                .await,
        );
        if report.summary.data_unavailable == report.summary.evaluated {
            return Err(RunError::NoData(report.summary.evaluated));
        }

        if let Err(e) = self.notifier.send_report(&report).await {
            warn!(error = %e, "AnalysisRuntime: failed to deliver report");
        }
        Ok(report)
    }

    pub async fn last_run(&self) -> LastRun {
        self.last_run.read().await.clone()
    }

    pub async fn latest_report(&self) -> Option<Arc<Report>> {
        self.latest_report.read().await.clone()
    }

    pub fn is_running(&self) -> bool {
        self.run_lock.try_lock().is_err()
    }

    pub async fn send_test_message(&self) -> Result<(), NotifyError> {
        self.notifier
            .send_text("✅ *Swing scanner*\n\nNotification channel is working.")
            .await
    }
}
