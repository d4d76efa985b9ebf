//! Engine and service configuration.
//!
//! `AnalysisConfig` is an immutable value passed into each run. It is
//! validated once when the engine is built; a violation is fatal.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

const WEIGHT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("factor weights must sum to 1.0, got {0}")]
    WeightsSum(f64),
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("{name} must be greater than zero, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("invalid percentages: {0}")]
    Percentages(String),
    #[error("invalid market-cap tiers: {0}")]
    Tiers(String),
    #[error("invalid indicator parameters: {0}")]
    Indicators(String),
    #[error("invalid scoring policy: {0}")]
    Policy(String),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Returns the deployment environment (`APP_ENV`, defaults to `sandbox`)
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

/// Weights of the four factors in the final score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    pub momentum: f64,
    pub volume: f64,
    pub technical: f64,
    pub risk: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            momentum: 0.35,
            volume: 0.25,
            technical: 0.25,
            risk: 0.15,
        }
    }
}

impl FactorWeights {
    pub fn new(momentum: f64, volume: f64, technical: f64, risk: f64) -> Result<Self, ConfigError> {
        let weights = Self {
            momentum,
            volume,
            technical,
            risk,
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn total(&self) -> f64 {
        self.momentum + self.volume + self.technical + self.risk
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("momentum weight", self.momentum),
            ("volume weight", self.volume),
            ("technical weight", self.technical),
            ("risk weight", self.risk),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { name, value });
            }
        }
        let total = self.total();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::WeightsSum(total));
        }
        Ok(())
    }
}

impl FromStr for FactorWeights {
    type Err = ConfigError;

    /// Parses `"momentum,volume,technical,risk"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidValue {
            key: "FACTOR_WEIGHTS".to_string(),
            value: s.to_string(),
        };
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        match parts.as_slice() {
            [m, v, t, r] => Self::new(*m, *v, *t, *r),
            _ => Err(invalid()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketCapTier {
    /// Inclusive lower bound in USD
    pub min_market_cap: f64,
    pub multiplier: f64,
}

/// Market-cap multiplier tiers, largest floor first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCapTiers(pub Vec<MarketCapTier>);

impl Default for MarketCapTiers {
    fn default() -> Self {
        Self(vec![
            MarketCapTier {
                min_market_cap: 10_000_000_000.0,
                multiplier: 1.10,
            },
            MarketCapTier {
                min_market_cap: 1_000_000_000.0,
                multiplier: 1.00,
            },
            MarketCapTier {
                min_market_cap: 100_000_000.0,
                multiplier: 0.95,
            },
        ])
    }
}

impl MarketCapTiers {
    /// Multiplier of the first tier whose floor `market_cap` reaches
    pub fn multiplier(&self, market_cap: f64) -> Option<f64> {
        self.0
            .iter()
            .find(|tier| market_cap >= tier.min_market_cap)
            .map(|tier| tier.multiplier)
    }

    /// Floor of the smallest tier
    pub fn lowest_floor(&self) -> Option<f64> {
        self.0.last().map(|tier| tier.min_market_cap)
    }

    /// A market-cap filter below the smallest tier would admit assets that
    /// have no multiplier.
    pub fn check_filter(&self, min_market_cap: f64) -> Result<(), ConfigError> {
        match self.lowest_floor() {
            Some(floor) if min_market_cap < floor => Err(ConfigError::Tiers(format!(
                "minimum market cap {} is below the lowest tier floor {}",
                min_market_cap, floor
            ))),
            _ => Ok(()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.0.is_empty() {
            return Err(ConfigError::Tiers("at least one tier is required".to_string()));
        }
        for pair in self.0.windows(2) {
            if pair[1].min_market_cap >= pair[0].min_market_cap {
                return Err(ConfigError::Tiers(
                    "tiers must be ordered by strictly descending floor".to_string(),
                ));
            }
        }
        for tier in &self.0 {
            if !(tier.multiplier > 0.0) || !(tier.min_market_cap >= 0.0) {
                return Err(ConfigError::Tiers(format!(
                    "tier {:?} must have a positive multiplier and a non-negative floor",
                    tier
                )));
            }
        }
        Ok(())
    }
}

/// Indicator periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub ema_fast: u32,
    pub ema_slow: u32,
    pub rsi_period: u32,
    pub macd_fast: u32,
    pub macd_slow: u32,
    pub macd_signal: u32,
    pub atr_period: u32,
    pub volume_lookback: u32,
    /// Bars inspected for a fresh EMA crossover
    pub cross_lookback: u32,
    /// Bars spanned by the short-term trend
    pub trend_lookback: u32,
    /// Percent change beyond which the short-term trend is directional
    pub trend_threshold_pct: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_fast: 7,
            ema_slow: 25,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            atr_period: 14,
            volume_lookback: 20,
            cross_lookback: 3,
            trend_lookback: 10,
            trend_threshold_pct: 3.0,
        }
    }
}

impl IndicatorParams {
    /// Samples needed before every indicator in the bundle is defined
    pub fn min_samples(&self) -> usize {
        let macd = (self.macd_slow + self.macd_signal) as usize;
        let ema = self.ema_slow as usize + 1;
        let rsi = self.rsi_period as usize + 1;
        let atr = self.atr_period as usize + 1;
        let volume = self.volume_lookback as usize + 1;
        let trend = self.trend_lookback as usize;
        macd.max(ema).max(rsi).max(atr).max(volume).max(trend)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            self.ema_fast,
            self.ema_slow,
            self.rsi_period,
            self.macd_fast,
            self.macd_slow,
            self.macd_signal,
            self.atr_period,
            self.volume_lookback,
        ];
        if periods.iter().any(|p| *p == 0) {
            return Err(ConfigError::Indicators("periods must be at least 1".to_string()));
        }
        if self.trend_lookback < 2 {
            return Err(ConfigError::Indicators(format!(
                "trend lookback must span at least 2 bars, got {}",
                self.trend_lookback
            )));
        }
        if !(self.trend_threshold_pct >= 0.0) {
            return Err(ConfigError::Negative {
                name: "trend threshold",
                value: self.trend_threshold_pct,
            });
        }
        if self.ema_fast >= self.ema_slow {
            return Err(ConfigError::Indicators(format!(
                "fast EMA ({}) must be shorter than slow EMA ({})",
                self.ema_fast, self.ema_slow
            )));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(ConfigError::Indicators(format!(
                "MACD fast ({}) must be shorter than MACD slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        Ok(())
    }
}

/// Thresholds used by the factor scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub momentum_base: f64,
    /// Fast EMA above slow EMA
    pub ema_cross_bonus: f64,
    /// Bullish cross happened within the lookback window
    pub fresh_cross_bonus: f64,
    /// Price above fast EMA above slow EMA
    pub alignment_bonus: f64,
    pub histogram_positive_bonus: f64,
    pub histogram_turn_bonus: f64,

    /// Volume ratio at which the volume score reaches 10
    pub volume_saturation_ratio: f64,
    /// Fallback when the series has no volume: 24h turnover tiers
    pub turnover_base: f64,
    pub turnover_tiers: Vec<(f64, f64)>,

    pub rsi_healthy_low: f64,
    pub rsi_healthy_high: f64,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// Technical score at or beyond the oversold/overbought bounds
    pub rsi_extreme_score: f64,

    /// Risk points lost per percent of ATR relative to price
    pub atr_pct_penalty: f64,
    /// Multiple of ATR a stop must clear to stay outside noise
    pub stop_atr_multiple: f64,
    pub stop_noise_penalty: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            momentum_base: 2.0,
            ema_cross_bonus: 2.0,
            fresh_cross_bonus: 1.0,
            alignment_bonus: 3.0,
            histogram_positive_bonus: 1.0,
            histogram_turn_bonus: 1.0,
            volume_saturation_ratio: 2.0,
            turnover_base: 4.0,
            turnover_tiers: vec![(10_000_000.0, 3.0), (50_000_000.0, 3.0)],
            rsi_healthy_low: 40.0,
            rsi_healthy_high: 65.0,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            rsi_extreme_score: 2.0,
            atr_pct_penalty: 1.2,
            stop_atr_multiple: 1.0,
            stop_noise_penalty: 3.0,
        }
    }
}

impl ScoringPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rsi_oversold < self.rsi_healthy_low
            && self.rsi_healthy_low <= self.rsi_healthy_high
            && self.rsi_healthy_high < self.rsi_overbought)
        {
            return Err(ConfigError::Policy(
                "RSI bounds must satisfy oversold < healthy low <= healthy high < overbought"
                    .to_string(),
            ));
        }
        if !(self.volume_saturation_ratio > 0.0) {
            return Err(ConfigError::NotPositive {
                name: "volume saturation ratio",
                value: self.volume_saturation_ratio,
            });
        }
        for (name, value) in [
            ("momentum base", self.momentum_base),
            ("EMA cross bonus", self.ema_cross_bonus),
            ("fresh cross bonus", self.fresh_cross_bonus),
            ("alignment bonus", self.alignment_bonus),
            ("histogram bonus", self.histogram_positive_bonus),
            ("histogram turn bonus", self.histogram_turn_bonus),
            ("ATR penalty", self.atr_pct_penalty),
            ("stop ATR multiple", self.stop_atr_multiple),
            ("stop noise penalty", self.stop_noise_penalty),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { name, value });
            }
        }
        Ok(())
    }
}

/// Trade-level percentages, expressed in percent (2.5 means 2.5%)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub stop_loss_pct: f64,
    pub target_1_pct: f64,
    pub target_2_pct: f64,
    pub entry_zone_pct: f64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            stop_loss_pct: 2.5,
            target_1_pct: 10.0,
            target_2_pct: 20.0,
            entry_zone_pct: 1.5,
        }
    }
}

impl LevelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("stop-loss percentage", self.stop_loss_pct),
            ("target 1 percentage", self.target_1_pct),
            ("target 2 percentage", self.target_2_pct),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        if !(self.entry_zone_pct >= 0.0) {
            return Err(ConfigError::Negative {
                name: "entry zone percentage",
                value: self.entry_zone_pct,
            });
        }
        if self.stop_loss_pct >= 100.0 {
            return Err(ConfigError::Percentages(format!(
                "stop loss of {}% leaves no positive stop price",
                self.stop_loss_pct
            )));
        }
        if self.target_1_pct >= self.target_2_pct {
            return Err(ConfigError::Percentages(format!(
                "target 1 ({}%) must be below target 2 ({}%)",
                self.target_1_pct, self.target_2_pct
            )));
        }
        Ok(())
    }
}

/// Everything a run depends on besides market data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub min_score: f64,
    pub min_market_cap: f64,
    pub max_candidates: usize,
    /// Assets processed concurrently
    pub concurrency: usize,
    pub lookback_days: u32,
    /// Reported candidates at or above this score are flagged for alerts
    pub alert_score: f64,
    pub weights: FactorWeights,
    pub tiers: MarketCapTiers,
    pub indicators: IndicatorParams,
    pub scoring: ScoringPolicy,
    pub levels: LevelConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_score: 7.5,
            min_market_cap: 100_000_000.0,
            max_candidates: 10,
            concurrency: 8,
            lookback_days: 30,
            alert_score: 8.5,
            weights: FactorWeights::default(),
            tiers: MarketCapTiers::default(),
            indicators: IndicatorParams::default(),
            scoring: ScoringPolicy::default(),
            levels: LevelConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.tiers.validate()?;
        self.indicators.validate()?;
        self.scoring.validate()?;
        self.levels.validate()?;

        if !(0.0..=10.0).contains(&self.min_score) {
            return Err(ConfigError::InvalidValue {
                key: "min_score".to_string(),
                value: self.min_score.to_string(),
            });
        }
        if !(self.min_market_cap >= 0.0) {
            return Err(ConfigError::Negative {
                name: "minimum market cap",
                value: self.min_market_cap,
            });
        }
        self.tiers.check_filter(self.min_market_cap)?;
        if self.max_candidates == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_candidates".to_string(),
                value: "0".to_string(),
            });
        }
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                key: "concurrency".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Defaults overridden by environment variables, then validated
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = env_parse("MIN_SCORE")? {
            config.min_score = v;
        }
        if let Some(v) = env_parse("MIN_MARKET_CAP")? {
            config.min_market_cap = v;
        }
        if let Some(v) = env_parse("MAX_CANDIDATES")? {
            config.max_candidates = v;
        }
        if let Some(v) = env_parse("ANALYSIS_CONCURRENCY")? {
            config.concurrency = v;
        }
        if let Some(v) = env_parse("LOOKBACK_DAYS")? {
            config.lookback_days = v;
        }
        if let Some(v) = env_parse("ALERT_SCORE")? {
            config.alert_score = v;
        }
        if let Some(v) = env_parse("STOP_LOSS_PCT")? {
            config.levels.stop_loss_pct = v;
        }
        if let Some(v) = env_parse("TARGET_1_PCT")? {
            config.levels.target_1_pct = v;
        }
        if let Some(v) = env_parse("TARGET_2_PCT")? {
            config.levels.target_2_pct = v;
        }
        if let Ok(raw) = env::var("FACTOR_WEIGHTS") {
            config.weights = raw.parse()?;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Settings of the service shell around the engine
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub port: u16,
    /// Six-field cron expression, evaluated in UTC
    pub analysis_cron: String,
    pub coingecko_base_url: String,
    pub coingecko_api_key: Option<String>,
    /// Coins requested from the markets endpoint
    pub universe_size: usize,
    /// Tradeable coins actually analysed per run
    pub process_limit: usize,
    pub request_delay_ms: u64,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 10000,
            analysis_cron: "0 30 8 * * *".to_string(),
            coingecko_base_url: "https://api.coingecko.com/api/v3".to_string(),
            coingecko_api_key: None,
            universe_size: 100,
            process_limit: 25,
            request_delay_ms: 3000,
            telegram_bot_token: None,
            telegram_chat_id: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = env_parse("PORT")? {
            config.port = v;
        }
        if let Ok(v) = env::var("ANALYSIS_CRON") {
            config.analysis_cron = v;
        }
        if let Ok(v) = env::var("COINGECKO_BASE_URL") {
            config.coingecko_base_url = v;
        }
        config.coingecko_api_key = env_non_empty("COINGECKO_API_KEY");
        if let Some(v) = env_parse("UNIVERSE_SIZE")? {
            config.universe_size = v;
        }
        if let Some(v) = env_parse("PROCESS_LIMIT")? {
            config.process_limit = v;
        }
        if let Some(v) = env_parse("REQUEST_DELAY_MS")? {
            config.request_delay_ms = v;
        }
        config.telegram_bot_token = env_non_empty("TELEGRAM_BOT_TOKEN");
        config.telegram_chat_id = env_non_empty("TELEGRAM_CHAT_ID");

        Ok(config)
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}
