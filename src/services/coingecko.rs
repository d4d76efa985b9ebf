//! CoinGecko market data provider
//!
//! Free tier friendly: one request at a time, a minimum delay between
//! requests, and exponential backoff when the API answers 429.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::ServiceConfig;
use crate::models::asset::AssetMeta;
use crate::models::market::MarketContext;
use crate::models::series::{Candle, PriceSeries};
use crate::services::error::DataError;
use crate::services::market_data::MarketDataProvider;

/// Stablecoins and wrapped dollars never worth swing-trading
pub const EXCLUDED_SYMBOLS: &[&str] = &[
    "USDT", "USDC", "DAI", "BUSD", "USDS", "USDE", "PYUSD", "TUSD", "FDUSD", "USDT0", "BSC-USD",
];

const MAX_RETRIES: usize = 3;

/// One row of `/coins/markets`
#[derive(Debug, Clone, Deserialize)]
pub struct MarketCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub price_change_percentage_7d_in_currency: Option<f64>,
}

impl MarketCoin {
    fn to_meta(&self) -> AssetMeta {
        AssetMeta::new(
            self.symbol.to_uppercase(),
            self.market_cap.unwrap_or(0.0),
            self.current_price.unwrap_or(0.0),
        )
        .with_name(self.name.clone())
        .with_total_volume(self.total_volume.unwrap_or(0.0))
        .with_price_changes(
            self.price_change_percentage_24h,
            self.price_change_percentage_7d_in_currency,
        )
    }
}

/// `/global` envelope
#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

#[derive(Debug, Default, Deserialize)]
struct GlobalData {
    #[serde(default)]
    active_cryptocurrencies: u64,
    #[serde(default)]
    total_market_cap: HashMap<String, f64>,
    #[serde(default)]
    total_volume: HashMap<String, f64>,
    #[serde(default)]
    market_cap_percentage: HashMap<String, f64>,
}

impl GlobalData {
    fn to_context(&self) -> MarketContext {
        let usd = |map: &HashMap<String, f64>| map.get("usd").copied().unwrap_or(0.0);
        MarketContext {
            btc_dominance: self.market_cap_percentage.get("btc").copied().unwrap_or(0.0),
            total_market_cap: usd(&self.total_market_cap),
            total_volume_24h: usd(&self.total_volume),
            active_cryptocurrencies: self.active_cryptocurrencies,
        }
    }
}

pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    universe_size: usize,
    process_limit: usize,
    request_delay: Duration,
    last_request: Mutex<Option<Instant>>,
    /// Uppercase symbol to market row, refreshed by `universe()`
    markets: RwLock<HashMap<String, MarketCoin>>,
}

impl CoinGeckoClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, DataError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &ServiceConfig) -> Self {
        Self {
            client,
            base_url: config.coingecko_base_url.trim_end_matches('/').to_string(),
            api_key: config.coingecko_api_key.clone(),
            universe_size: config.universe_size,
            process_limit: config.process_limit,
            request_delay: Duration::from_millis(config.request_delay_ms),
            last_request: Mutex::new(None),
            markets: RwLock::new(HashMap::new()),
        }
    }

    /// Wait until the minimum delay since the previous request has passed
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.request_delay {
                tokio::time::sleep(self.request_delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, DataError> {
        self.throttle().await;

        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self.client.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-pro-api-key", key);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(DataError::RateLimited),
            status if !status.is_success() => Err(DataError::Status {
                status: status.as_u16(),
            }),
            _ => Ok(response.json::<T>().await?),
        }
    }

    /// GET with retry on rate limiting
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, DataError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.request_delay)
            .with_max_times(MAX_RETRIES);

        (|| async { self.send::<T>(endpoint, query).await })
            .retry(backoff)
            .when(|e| matches!(e, DataError::RateLimited))
            .notify(|_, wait| {
                warn!(endpoint = %endpoint, wait_ms = wait.as_millis() as u64, "CoinGecko: rate limited, backing off");
            })
            .await
    }

    /// Fetch top coins by market cap and cache them by symbol
    pub async fn refresh_markets(&self) -> Result<Vec<MarketCoin>, DataError> {
        info!(top_n = self.universe_size, "CoinGecko: fetching top {} coins", self.universe_size);

        let coins: Vec<MarketCoin> = self
            .get_json(
                "/coins/markets",
                &[
                    ("vs_currency", "usd".to_string()),
                    ("order", "market_cap_desc".to_string()),
                    ("per_page", self.universe_size.to_string()),
                    ("page", "1".to_string()),
                    ("sparkline", "false".to_string()),
                    ("price_change_percentage", "24h,7d".to_string()),
                ],
            )
            .await?;

        let mut markets = self.markets.write().await;
        markets.clear();
        for coin in &coins {
            markets
                .entry(coin.symbol.to_uppercase())
                .or_insert_with(|| coin.clone());
        }

        debug!(count = coins.len(), "CoinGecko: cached {} market rows", coins.len());
        Ok(coins)
    }

    async fn market(&self, symbol: &str) -> Result<MarketCoin, DataError> {
        if self.markets.read().await.is_empty() {
            self.refresh_markets().await?;
        }
        self.markets
            .read()
            .await
            .get(symbol)
            .cloned()
            .ok_or_else(|| DataError::UnknownSymbol(symbol.to_string()))
    }
}

/// Convert `/coins/{id}/ohlc` rows (`[ms, open, high, low, close]`) into
/// candles. Rows sharing a timestamp keep the latest one. CoinGecko OHLC
/// carries no volume.
pub fn candles_from_ohlc(rows: &[[f64; 5]]) -> Vec<Candle> {
    let mut candles: Vec<Candle> = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(timestamp) = DateTime::<Utc>::from_timestamp_millis(row[0] as i64) else {
            continue;
        };
        let candle = Candle::new(row[1], row[2], row[3], row[4], 0.0, timestamp);
        match candles.last_mut() {
            Some(last) if last.timestamp == timestamp => *last = candle,
            _ => candles.push(candle),
        }
    }
    candles
}

#[async_trait]
impl MarketDataProvider for CoinGeckoClient {
    async fn universe(&self) -> Result<Vec<String>, DataError> {
        let coins = self.refresh_markets().await?;

        let mut symbols: Vec<String> = Vec::new();
        for coin in &coins {
            let symbol = coin.symbol.to_uppercase();
            if EXCLUDED_SYMBOLS.contains(&symbol.as_str()) || symbols.contains(&symbol) {
                continue;
            }
            symbols.push(symbol);
            if symbols.len() >= self.process_limit {
                break;
            }
        }

        info!(
            fetched = coins.len(),
            tradeable = symbols.len(),
            "CoinGecko: processing {} tradeable coins",
            symbols.len()
        );
        Ok(symbols)
    }

    async fn fetch_price_series(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<PriceSeries, DataError> {
        let coin = self.market(symbol).await?;
        let rows: Vec<[f64; 5]> = self
            .get_json(
                &format!("/coins/{}/ohlc", coin.id),
                &[
                    ("vs_currency", "usd".to_string()),
                    ("days", lookback_days.to_string()),
                ],
            )
            .await
            .map_err(|e| match e {
                DataError::RateLimited => e,
                other => DataError::unavailable(symbol, other.to_string()),
            })?;

        let candles = candles_from_ohlc(&rows);
        debug!(symbol = %symbol, count = candles.len(), "CoinGecko: fetched {} OHLC rows", candles.len());

        PriceSeries::new(symbol, candles).map_err(|source| DataError::InvalidSeries {
            symbol: symbol.to_string(),
            source,
        })
    }

    async fn fetch_asset_meta(&self, symbol: &str) -> Result<AssetMeta, DataError> {
        Ok(self.market(symbol).await?.to_meta())
    }

    async fn fetch_market_context(&self) -> Result<Option<MarketContext>, DataError> {
        let global: GlobalResponse = self.get_json("/global", &[]).await?;
        let context = global.data.to_context();
        debug!(
            btc_dominance = context.btc_dominance,
            total_market_cap = context.total_market_cap,
            "CoinGecko: fetched market context"
        );
        Ok(Some(context))
    }
}
