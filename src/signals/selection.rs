//! Candidate selection: market-cap floor, weighted final score, ranking.

use std::cmp::Ordering;

use crate::config::{AnalysisConfig, ConfigError, FactorWeights, MarketCapTiers};
use crate::models::signal::{ScoredCandidate, SubScores};

/// Weighted sum of sub-scores times the market-cap multiplier
pub fn final_score(sub_scores: &SubScores, weights: &FactorWeights, multiplier: f64) -> f64 {
    let weighted = sub_scores.momentum * weights.momentum
        + sub_scores.volume * weights.volume
        + sub_scores.technical * weights.technical
        + sub_scores.risk * weights.risk;
    weighted * multiplier
}

/// Best first: score, then market cap, then symbol
pub fn rank_order(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.final_score
        .total_cmp(&a.final_score)
        .then_with(|| b.market_cap.total_cmp(&a.market_cap))
        .then_with(|| a.symbol.cmp(&b.symbol))
}

/// Outcome of one selection pass
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub candidates: Vec<ScoredCandidate>,
    /// Scored assets at or above the market-cap floor
    pub passed_filter: usize,
    /// Candidates at or above the minimum score before the cap
    pub passed_cutoff: usize,
}

#[derive(Debug, Clone)]
pub struct CandidateSelector {
    weights: FactorWeights,
    tiers: MarketCapTiers,
    min_market_cap: f64,
    min_score: f64,
    max_candidates: usize,
}

impl CandidateSelector {
    /// Fails when the weights do not sum to 1.0, the tiers are malformed or
    /// the market-cap floor sits below the smallest tier
    pub fn new(config: &AnalysisConfig) -> Result<Self, ConfigError> {
        config.weights.validate()?;
        config.tiers.validate()?;
        config.tiers.check_filter(config.min_market_cap)?;

        Ok(Self {
            weights: config.weights,
            tiers: config.tiers.clone(),
            min_market_cap: config.min_market_cap,
            min_score: config.min_score,
            max_candidates: config.max_candidates,
        })
    }

    /// Hard exclusion below the market-cap floor
    pub fn passes_market_cap(&self, market_cap: f64) -> bool {
        market_cap >= self.min_market_cap
    }

    /// Tier multiplier, `None` below every tier
    pub fn market_cap_multiplier(&self, market_cap: f64) -> Option<f64> {
        self.tiers.multiplier(market_cap)
    }

    /// Build a candidate, or `None` if the asset is filtered out by market cap
    pub fn score_candidate(
        &self,
        symbol: &str,
        market_cap: f64,
        entry_price: f64,
        sub_scores: SubScores,
    ) -> Option<ScoredCandidate> {
        if !self.passes_market_cap(market_cap) {
            return None;
        }
        let multiplier = self.market_cap_multiplier(market_cap)?;

        Some(ScoredCandidate {
            symbol: symbol.to_string(),
            market_cap,
            final_score: final_score(&sub_scores, &self.weights, multiplier),
            sub_scores,
            market_cap_multiplier: multiplier,
            entry_price,
        })
    }

    /// Apply the score cutoff, rank and cap.
    ///
    /// Candidates below the market-cap floor are dropped first, so callers
    /// may pass unfiltered candidates. An empty result is valid.
    pub fn select(&self, candidates: Vec<ScoredCandidate>) -> Selection {
        let filtered: Vec<ScoredCandidate> = candidates
            .into_iter()
            .filter(|c| self.passes_market_cap(c.market_cap))
            .collect();
        let passed_filter = filtered.len();

        let mut passing: Vec<ScoredCandidate> = filtered
            .into_iter()
            .filter(|c| c.final_score >= self.min_score)
            .collect();
        let passed_cutoff = passing.len();

        passing.sort_by(rank_order);
        passing.truncate(self.max_candidates);

        Selection {
            candidates: passing,
            passed_filter,
            passed_cutoff,
        }
    }
}
