//! Swing scanner server
//!
//! Runs the daily analysis on a cron schedule and serves the HTTP API
//! (health, status, manual trigger, latest report, metrics).

use std::sync::Arc;

use swingscan::config::{get_environment, AnalysisConfig, ServiceConfig};
use swingscan::core::http::{start_server, AppState};
use swingscan::core::pipeline::AnalysisEngine;
use swingscan::core::runtime::AnalysisRuntime;
use swingscan::core::scheduler::JobScheduler;
use swingscan::logging::init_logging;
use swingscan::metrics::Metrics;
use swingscan::services::{CoinGeckoClient, LogNotifier, Notifier, TelegramNotifier};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_logging();

    let service = ServiceConfig::from_env()?;
    let analysis = AnalysisConfig::from_env()?;

    info!(
        environment = %get_environment(),
        port = service.port,
        cron = %service.analysis_cron,
        min_score = analysis.min_score,
        "Starting swing scanner server"
    );

    let provider = Arc::new(CoinGeckoClient::new(&service)?);
    let telegram = TelegramNotifier::new(
        service.telegram_bot_token.clone(),
        service.telegram_chat_id.clone(),
    );
    let notifier: Arc<dyn Notifier> = if telegram.is_configured() {
        info!("Telegram notifier configured");
        Arc::new(telegram)
    } else {
        warn!("Telegram credentials missing, reports will only be logged");
        Arc::new(LogNotifier)
    };

    let metrics = Arc::new(Metrics::new()?);
    let engine = AnalysisEngine::new(analysis)?;
    let runtime = Arc::new(AnalysisRuntime::new(
        engine,
        provider,
        notifier,
        metrics.clone(),
    ));

    let scheduler = Arc::new(JobScheduler::new(runtime.clone(), &service.analysis_cron)?);
    scheduler.start().await;
    if let Some(next) = scheduler.next_run() {
        info!(next_run = %next, "Next scheduled analysis at {}", next);
    }

    let state = AppState::new(runtime, Some(scheduler.clone()), metrics);
    start_server(service.port, state, async {
        if signal::ctrl_c().await.is_ok() {
            info!("Shutting down...");
        }
    })
    .await?;

    scheduler.stop().await;
    Ok(())
}
