//! Notification interface. Renders a report to some transport.

use async_trait::async_trait;
use tracing::info;

use crate::models::report::Report;
use crate::services::error::NotifyError;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a finished report
    async fn send_report(&self, report: &Report) -> Result<(), NotifyError>;

    /// Deliver a free-form message, used for connectivity checks
    async fn send_text(&self, text: &str) -> Result<(), NotifyError>;
}

/// Writes reports to the log only
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_report(&self, report: &Report) -> Result<(), NotifyError> {
        info!(
            evaluated = report.summary.evaluated,
            passed_filter = report.summary.passed_filter,
            reported = report.summary.reported,
            "Report: {} candidates from {} assets",
            report.summary.reported,
            report.summary.evaluated
        );
        if let Some(ctx) = &report.market_context {
            info!(
                btc_dominance = ctx.btc_dominance,
                total_market_cap = ctx.total_market_cap,
                total_volume_24h = ctx.total_volume_24h,
                "Report: market context"
            );
        }
        for entry in &report.entries {
            info!(
                rank = entry.rank,
                symbol = %entry.candidate.symbol,
                score = entry.candidate.final_score,
                entry = entry.levels.entry,
                stop_loss = entry.levels.stop_loss,
                target_1 = entry.levels.target_1,
                target_2 = entry.levels.target_2,
                "Report: #{} {} score {:.2}",
                entry.rank,
                entry.candidate.symbol,
                entry.candidate.final_score
            );
        }
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        info!(message = %text, "Notifier message");
        Ok(())
    }
}
