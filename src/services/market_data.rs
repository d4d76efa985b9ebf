//! Market data provider interface and an in-memory implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::asset::AssetMeta;
use crate::models::market::MarketContext;
use crate::models::series::{Candle, PriceSeries};
use crate::services::error::DataError;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Symbols to analyse this run
    async fn universe(&self) -> Result<Vec<String>, DataError>;

    /// Price history covering the last `lookback_days`
    async fn fetch_price_series(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<PriceSeries, DataError>;

    async fn fetch_asset_meta(&self, symbol: &str) -> Result<AssetMeta, DataError>;

    /// Market-wide figures for the report header. Providers without a
    /// source return `None`.
    async fn fetch_market_context(&self) -> Result<Option<MarketContext>, DataError> {
        Ok(None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticAsset {
    pub meta: AssetMeta,
    pub candles: Vec<Candle>,
}

/// Serves a frozen universe from memory.
///
/// Used by the one-shot binary with a JSON fixture and by tests. The
/// lookback argument is ignored; every stored candle is returned.
#[derive(Debug, Clone, Default)]
pub struct StaticMarketDataProvider {
    assets: BTreeMap<String, StaticAsset>,
    market_context: Option<MarketContext>,
}

#[derive(Deserialize)]
struct Fixture {
    assets: Vec<StaticAsset>,
    #[serde(default)]
    market_context: Option<MarketContext>,
}

impl StaticMarketDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, meta: AssetMeta, candles: Vec<Candle>) -> Self {
        self.insert(meta, candles);
        self
    }

    pub fn with_market_context(mut self, context: MarketContext) -> Self {
        self.market_context = Some(context);
        self
    }

    pub fn insert(&mut self, meta: AssetMeta, candles: Vec<Candle>) {
        self.assets
            .insert(meta.symbol.clone(), StaticAsset { meta, candles });
    }

    /// Parse `{"assets": [{"meta": {..}, "candles": [..]}, ..]}` with an
    /// optional `"market_context"`
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let fixture: Fixture = serde_json::from_str(raw)?;
        let mut provider = Self::new();
        provider.market_context = fixture.market_context;
        for asset in fixture.assets {
            provider.insert(asset.meta, asset.candles);
        }
        Ok(provider)
    }

    fn asset(&self, symbol: &str) -> Result<&StaticAsset, DataError> {
        self.assets
            .get(symbol)
            .ok_or_else(|| DataError::unavailable(symbol, "no data stored for symbol"))
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketDataProvider {
    async fn universe(&self) -> Result<Vec<String>, DataError> {
        Ok(self.assets.keys().cloned().collect())
    }

    async fn fetch_price_series(
        &self,
        symbol: &str,
        _lookback_days: u32,
    ) -> Result<PriceSeries, DataError> {
        let asset = self.asset(symbol)?;
        PriceSeries::new(symbol, asset.candles.clone()).map_err(|source| {
            DataError::InvalidSeries {
                symbol: symbol.to_string(),
                source,
            }
        })
    }

    async fn fetch_asset_meta(&self, symbol: &str) -> Result<AssetMeta, DataError> {
        Ok(self.asset(symbol)?.meta.clone())
    }

    async fn fetch_market_context(&self) -> Result<Option<MarketContext>, DataError> {
        Ok(self.market_context.clone())
    }
}
