use serde::{Deserialize, Serialize};

/// Market metadata for one asset, supplied by the data collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMeta {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub market_cap: f64,
    pub current_price: f64,
    /// 24h traded value in USD
    #[serde(default)]
    pub total_volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_change_24h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_change_7d: Option<f64>,
}

impl AssetMeta {
    pub fn new(symbol: impl Into<String>, market_cap: f64, current_price: f64) -> Self {
        let symbol = symbol.into();
        Self {
            name: symbol.clone(),
            symbol,
            market_cap,
            current_price,
            total_volume: 0.0,
            price_change_24h: None,
            price_change_7d: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_total_volume(mut self, total_volume: f64) -> Self {
        self.total_volume = total_volume;
        self
    }

    pub fn with_price_changes(mut self, change_24h: Option<f64>, change_7d: Option<f64>) -> Self {
        self.price_change_24h = change_24h;
        self.price_change_7d = change_7d;
        self
    }

    /// Quote pair shown to traders
    pub fn pair(&self) -> String {
        format!("{}/USDT", self.symbol)
    }
}
