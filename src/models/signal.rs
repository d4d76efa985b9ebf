use serde::{Deserialize, Serialize};

use crate::models::asset::AssetMeta;
use crate::models::indicators::IndicatorBundle;

/// Normalized factor scores, each in `[0, 10]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub momentum: f64,
    pub volume: f64,
    pub technical: f64,
    pub risk: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub symbol: String,
    pub market_cap: f64,
    pub sub_scores: SubScores,
    pub final_score: f64,
    pub market_cap_multiplier: f64,
    pub entry_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLevels {
    pub entry: f64,
    pub entry_zone: (f64, f64),
    pub stop_loss: f64,
    pub target_1: f64,
    pub target_2: f64,
    /// Reward to target 1 per unit of risk to the stop
    pub risk_reward_t1: f64,
}

/// Successful per-asset pipeline result, ready for selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetEvaluation {
    pub meta: AssetMeta,
    pub bundle: IndicatorBundle,
    pub sub_scores: SubScores,
    pub levels: TradeLevels,
}
