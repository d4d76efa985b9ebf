use serde::{Deserialize, Serialize};

/// Market-wide figures shown alongside a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    /// Bitcoin share of total market cap, in percent
    pub btc_dominance: f64,
    pub total_market_cap: f64,
    pub total_volume_24h: f64,
    pub active_cryptocurrencies: u64,
}
