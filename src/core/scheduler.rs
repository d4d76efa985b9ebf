//! Cron-based scheduler for daily analysis runs

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cron::Schedule;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::core::runtime::{AnalysisRuntime, RunError};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid cron expression '{expr}': {reason}")]
    InvalidCron { expr: String, reason: String },
}

/// Triggers `AnalysisRuntime::run_once` on a cron schedule, evaluated in UTC
pub struct JobScheduler {
    runtime: Arc<AnalysisRuntime>,
    schedule: Schedule,
    cron_expr: String,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl JobScheduler {
    /// Cron format: second minute hour day month weekday
    pub fn new(runtime: Arc<AnalysisRuntime>, cron_expr: &str) -> Result<Self, SchedulerError> {
        let schedule = Schedule::from_str(cron_expr).map_err(|e| SchedulerError::InvalidCron {
            expr: cron_expr.to_string(),
            reason: e.to_string(),
        })?;

        info!(cron = %cron_expr, "JobScheduler: created with cron {}", cron_expr);

        Ok(Self {
            runtime,
            schedule,
            cron_expr: cron_expr.to_string(),
            handle: Arc::new(RwLock::new(None)),
        })
    }

    pub fn cron_expr(&self) -> &str {
        &self.cron_expr
    }

    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        self.schedule.upcoming(Utc).next()
    }

    /// Spawn the cron loop. Returns `false` if it is already running.
    pub async fn start(&self) -> bool {
        let mut slot = self.handle.write().await;
        if slot.is_some() {
            info!("JobScheduler: already started");
            return false;
        }

        let runtime = self.runtime.clone();
        let schedule = self.schedule.clone();

        let handle = tokio::spawn(async move {
            info!("JobScheduler: started, waiting for cron schedule...");

            loop {
                let Some(next_tick) = schedule.upcoming(Utc).next() else {
                    tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                    continue;
                };
                let now = Utc::now();
                if next_tick > now {
                    let duration = (next_tick - now).to_std().unwrap_or_default();
                    tokio::time::sleep(duration).await;
                }

                info!(tick = %next_tick, "JobScheduler: cron tick, starting analysis");
                match runtime.run_once().await {
                    Ok(_) => {}
                    Err(RunError::AlreadyRunning) => {
                        info!("JobScheduler: previous run still in progress, skipping tick");
                    }
                    Err(e) => {
                        error!(error = %e, "JobScheduler: scheduled analysis failed");
                    }
                }
            }
        });

        *slot = Some(handle);
        info!("JobScheduler: started successfully");
        true
    }

    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("JobScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }
}
