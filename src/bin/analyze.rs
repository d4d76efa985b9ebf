//! One-shot analysis
//!
//! Usage: `analyze [--fixture path/to/assets.json] [--notify]`
//!
//! Without `--fixture`, market data comes from CoinGecko. The report is
//! printed as JSON on stdout.

use std::collections::BTreeSet;
use std::sync::Arc;

use clap::Parser;
use swingscan::cli::AnalyzeArgs;
use swingscan::config::{AnalysisConfig, ServiceConfig};
use swingscan::core::pipeline::AnalysisEngine;
use swingscan::logging::init_logging;
use swingscan::services::{
    CoinGeckoClient, LogNotifier, MarketDataProvider, Notifier, StaticMarketDataProvider,
    TelegramNotifier,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = AnalyzeArgs::parse();
    dotenvy::dotenv().ok();
    init_logging();

    let service = ServiceConfig::from_env()?;
    let engine = AnalysisEngine::new(AnalysisConfig::from_env()?)?;

    let provider: Arc<dyn MarketDataProvider> = match &args.fixture {
        Some(path) => {
            info!(path = %path.display(), "Loading market data fixture");
            let raw = std::fs::read_to_string(path)?;
            Arc::new(StaticMarketDataProvider::from_json(&raw)?)
        }
        None => Arc::new(CoinGeckoClient::new(&service)?),
    };

    let universe: BTreeSet<String> = provider.universe().await?.into_iter().collect();
    let report = engine.run_analysis(provider, &universe).await;

    if args.notify {
        let telegram = TelegramNotifier::new(service.telegram_bot_token, service.telegram_chat_id);
        if telegram.is_configured() {
            telegram.send_report(&report).await?;
        } else {
            LogNotifier.send_report(&report).await?;
        }
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
