//! Telegram Bot API notifier

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::models::indicators::TrendDirection;
use crate::models::report::{Report, ReportEntry};
use crate::services::error::NotifyError;
use crate::services::notifier::Notifier;

const DEFAULT_API_URL: &str = "https://api.telegram.org";
/// Entries rendered in full; the rest are summarised in a footer
const DETAILED_ENTRIES: usize = 3;
const RULE: &str = "━━━━━━━━━━━━━━━━━━━━";

pub struct TelegramNotifier {
    client: Client,
    api_url: String,
    token: Option<String>,
    chat_id: Option<String>,
}

impl TelegramNotifier {
    pub fn new(token: Option<String>, chat_id: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: DEFAULT_API_URL.to_string(),
            token,
            chat_id,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some() && self.chat_id.is_some()
    }

    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let (Some(token), Some(chat_id)) = (&self.token, &self.chat_id) else {
            warn!("Telegram: credentials not configured");
            return Err(NotifyError::NotConfigured);
        };

        let url = format!("{}/bot{}/sendMessage", self.api_url, token);
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "Markdown",
                "disable_web_page_preview": true,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Telegram: message sent");
        Ok(())
    }
}

/// `$2.45T` above a trillion, `$1.2B` above a billion, `$350M` below
pub fn format_market_cap(market_cap: f64) -> String {
    if market_cap >= 1_000_000_000_000.0 {
        format!("${:.2}T", market_cap / 1_000_000_000_000.0)
    } else if market_cap >= 1_000_000_000.0 {
        format!("${:.1}B", market_cap / 1_000_000_000.0)
    } else {
        format!("${:.0}M", market_cap / 1_000_000.0)
    }
}

pub fn format_header(report: &Report) -> String {
    let market = match &report.market_context {
        Some(ctx) => format!(
            "BTC dominance: {:.1}%\nTotal market cap: {}\n",
            ctx.btc_dominance,
            format_market_cap(ctx.total_market_cap)
        ),
        None => String::new(),
    };
    format!(
        "*CRYPTO SWING SCAN*\n{} UTC\n{}\n{}{} qualified of {} analysed ({} skipped)",
        report.generated_at.format("%d %b %Y, %H:%M"),
        RULE,
        market,
        report.summary.passed_cutoff,
        report.summary.evaluated,
        report.summary.skipped()
    )
}

pub fn format_entry(entry: &ReportEntry) -> String {
    let c = &entry.candidate;
    let l = &entry.levels;
    let pct = |level: f64| (level - l.entry) / l.entry * 100.0;

    let mut signals = Vec::new();
    if entry.indicators.ema_aligned(l.entry) {
        signals.push("EMA".to_string());
    }
    if entry.indicators.macd.histogram > 0.0 {
        signals.push("MACD".to_string());
    }
    signals.push(format!("RSI {:.0}", entry.indicators.rsi.value));
    let trend = &entry.indicators.trend;
    if trend.direction != TrendDirection::Neutral {
        signals.push(format!("Trend {} ({:+.1}%)", trend.direction, trend.change_pct));
    }

    format!(
        "#{} *{}* ({})\n{}\nScore: *{:.1}/10*\nPrice: ${:.4}\nCap: {}\n\nEntry: ${:.4} - ${:.4}\nStop: ${:.4} ({:.1}%)\nT1: ${:.4} (+{:.1}%)\nT2: ${:.4} (+{:.1}%)\n\nSignals: {}",
        entry.rank,
        c.symbol,
        entry.name,
        RULE,
        c.final_score,
        l.entry,
        format_market_cap(c.market_cap),
        l.entry_zone.0,
        l.entry_zone.1,
        l.stop_loss,
        pct(l.stop_loss),
        l.target_1,
        pct(l.target_1),
        l.target_2,
        pct(l.target_2),
        signals.join(" | ")
    )
}

pub fn format_alert(entry: &ReportEntry) -> String {
    let l = &entry.levels;
    format!(
        "*HIGH SCORE ALERT*\n\n*{}* ({})\nScore: *{:.1}/10*\n\n${:.4}\nTarget 1: ${:.4} (+{:.1}%)",
        entry.candidate.symbol,
        entry.name,
        entry.candidate.final_score,
        l.entry,
        l.target_1,
        (l.target_1 - l.entry) / l.entry * 100.0
    )
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_report(&self, report: &Report) -> Result<(), NotifyError> {
        self.send_message(&format_header(report)).await?;

        if report.is_empty() {
            self.send_message("*No opportunities* met the scoring criteria this run.")
                .await?;
            return Ok(());
        }

        for entry in report.entries.iter().take(DETAILED_ENTRIES) {
            self.send_message(&format_entry(entry)).await?;
        }
        if report.entries.len() > DETAILED_ENTRIES {
            self.send_message(&format!(
                "+{} more opportunities in the full report",
                report.entries.len() - DETAILED_ENTRIES
            ))
            .await?;
        }

        for entry in report.high_score_entries() {
            self.send_message(&format_alert(entry)).await?;
        }
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        self.send_message(text).await
    }
}
