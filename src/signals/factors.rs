//! Factor scorer: indicator bundle + market metadata to four sub-scores.
//!
//! Every sub-score is a pure function of its inputs and is clipped to
//! `[0, 10]`.

use crate::config::{LevelConfig, ScoringPolicy};
use crate::models::asset::AssetMeta;
use crate::models::indicators::IndicatorBundle;
use crate::models::signal::SubScores;
use crate::signals::scoring::{clip_score, interpolate, SCORE_MAX};

#[derive(Debug, Clone)]
pub struct FactorScorer {
    policy: ScoringPolicy,
    stop_loss_pct: f64,
}

impl FactorScorer {
    pub fn new(policy: ScoringPolicy, levels: &LevelConfig) -> Self {
        Self {
            policy,
            stop_loss_pct: levels.stop_loss_pct,
        }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn score(&self, bundle: &IndicatorBundle, meta: &AssetMeta) -> SubScores {
        SubScores {
            momentum: self.momentum_score(bundle, meta.current_price),
            volume: self.volume_score(bundle, meta),
            technical: self.technical_score(bundle.rsi.value),
            risk: self.risk_score(bundle, meta.current_price),
        }
    }

    /// Trend and MACD momentum. A bullish EMA cross inside the lookback
    /// window and a histogram that just turned positive earn extra points
    /// over an established trend.
    pub fn momentum_score(&self, bundle: &IndicatorBundle, price: f64) -> f64 {
        let p = &self.policy;
        let mut score = p.momentum_base;

        if bundle.ema_bullish() {
            score += p.ema_cross_bonus;
            if bundle.bars_since_cross.is_some() {
                score += p.fresh_cross_bonus;
            }
        }
        if bundle.ema_aligned(price) {
            score += p.alignment_bonus;
        }
        if bundle.macd.histogram > 0.0 {
            score += p.histogram_positive_bonus;
            if bundle.macd.turned_positive() {
                score += p.histogram_turn_bonus;
            }
        }

        clip_score(score)
    }

    /// Relative volume against the trailing baseline, saturating at the
    /// configured ratio. Without series volume, 24h turnover tiers apply.
    pub fn volume_score(&self, bundle: &IndicatorBundle, meta: &AssetMeta) -> f64 {
        let p = &self.policy;
        match bundle.volume.ratio() {
            Some(ratio) => clip_score(SCORE_MAX * ratio / p.volume_saturation_ratio),
            None => {
                let bonus: f64 = p
                    .turnover_tiers
                    .iter()
                    .filter(|(threshold, _)| meta.total_volume > *threshold)
                    .map(|(_, points)| points)
                    .sum();
                clip_score(p.turnover_base + bonus)
            }
        }
    }

    /// RSI inside the healthy band scores 10, falling linearly to the
    /// extreme score at the oversold/overbought bounds.
    pub fn technical_score(&self, rsi: f64) -> f64 {
        let p = &self.policy;
        let score = if rsi < p.rsi_healthy_low {
            interpolate(rsi, p.rsi_oversold, p.rsi_healthy_low, p.rsi_extreme_score, SCORE_MAX)
        } else if rsi > p.rsi_healthy_high {
            interpolate(rsi, p.rsi_healthy_high, p.rsi_overbought, SCORE_MAX, p.rsi_extreme_score)
        } else {
            SCORE_MAX
        };
        clip_score(score)
    }

    /// Lower for higher ATR relative to price. Penalized further when the
    /// configured stop sits inside ATR noise.
    pub fn risk_score(&self, bundle: &IndicatorBundle, price: f64) -> f64 {
        let p = &self.policy;
        let atr_pct = bundle.atr.percent_of(price);
        let mut score = SCORE_MAX - atr_pct * p.atr_pct_penalty;

        if atr_pct * p.stop_atr_multiple > self.stop_loss_pct {
            score -= p.stop_noise_penalty;
        }

        clip_score(score)
    }
}
