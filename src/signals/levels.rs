//! Stop-loss and target levels from fixed percentage offsets

use thiserror::Error;

use crate::config::{ConfigError, LevelConfig};
use crate::models::signal::TradeLevels;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LevelError {
    #[error("invalid entry price: {0}")]
    InvalidPrice(f64),
}

#[derive(Debug, Clone, Copy)]
pub struct LevelCalculator {
    config: LevelConfig,
}

impl LevelCalculator {
    pub fn new(config: LevelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Derive levels for a long entry at `entry_price`.
    ///
    /// Guarantees `stop_loss < entry < target_1 < target_2`.
    pub fn calculate(&self, entry_price: f64) -> Result<TradeLevels, LevelError> {
        if !entry_price.is_finite() || entry_price <= 0.0 {
            return Err(LevelError::InvalidPrice(entry_price));
        }

        let c = &self.config;
        let stop_loss = entry_price * (1.0 - c.stop_loss_pct / 100.0);
        let target_1 = entry_price * (1.0 + c.target_1_pct / 100.0);
        let target_2 = entry_price * (1.0 + c.target_2_pct / 100.0);
        let zone = entry_price * c.entry_zone_pct / 100.0;

        // Subnormal or huge entries can collapse or overflow the offsets.
        let ordered = stop_loss < entry_price && entry_price < target_1 && target_1 < target_2;
        if !ordered || !target_2.is_finite() {
            return Err(LevelError::InvalidPrice(entry_price));
        }

        let risk = entry_price - stop_loss;
        let risk_reward_t1 = if risk > 0.0 {
            (target_1 - entry_price) / risk
        } else {
            0.0
        };

        Ok(TradeLevels {
            entry: entry_price,
            entry_zone: (entry_price - zone, entry_price + zone),
            stop_loss,
            target_1,
            target_2,
            risk_reward_t1,
        })
    }
}

impl From<LevelError> for crate::models::report::SkipReason {
    fn from(error: LevelError) -> Self {
        match error {
            LevelError::InvalidPrice(price) => Self::InvalidPrice { price },
        }
    }
}
