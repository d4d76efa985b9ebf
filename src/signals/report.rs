//! Report assembly: structure only, no scoring decisions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::report::{Report, ReportEntry, RunSummary, SkipReason, SkippedAsset};
use crate::models::signal::AssetEvaluation;
use crate::signals::selection::Selection;

#[derive(Debug, Clone, Copy)]
pub struct ReportAssembler {
    alert_score: f64,
}

impl ReportAssembler {
    pub fn new(alert_score: f64) -> Self {
        Self { alert_score }
    }

    /// Combine the selection with per-asset details.
    ///
    /// `evaluated` is the size of the requested universe; `skipped` lists the
    /// assets whose pipeline failed before scoring.
    pub fn assemble(
        &self,
        generated_at: DateTime<Utc>,
        evaluated: usize,
        selection: Selection,
        evaluations: &[AssetEvaluation],
        mut skipped: Vec<SkippedAsset>,
    ) -> Report {
        let by_symbol: BTreeMap<&str, &AssetEvaluation> = evaluations
            .iter()
            .map(|e| (e.meta.symbol.as_str(), e))
            .collect();

        let entries: Vec<ReportEntry> = selection
            .candidates
            .into_iter()
            .filter_map(|candidate| {
                let evaluation = by_symbol.get(candidate.symbol.as_str())?;
                Some((candidate, *evaluation))
            })
            .enumerate()
            .map(|(i, (candidate, evaluation))| ReportEntry {
                rank: i + 1,
                name: evaluation.meta.name.clone(),
                pair: evaluation.meta.pair(),
                high_score: candidate.final_score >= self.alert_score,
                levels: evaluation.levels.clone(),
                indicators: evaluation.bundle.clone(),
                price_change_24h: evaluation.meta.price_change_24h,
                price_change_7d: evaluation.meta.price_change_7d,
                candidate,
            })
            .collect();

        skipped.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        let mut summary = RunSummary {
            evaluated,
            passed_filter: selection.passed_filter,
            passed_cutoff: selection.passed_cutoff,
            reported: entries.len(),
            ..RunSummary::default()
        };
        for asset in &skipped {
            match asset.reason {
                SkipReason::DataUnavailable { .. } => summary.data_unavailable += 1,
                SkipReason::InsufficientData { .. } => summary.insufficient_data += 1,
                SkipReason::InvalidData { .. } => summary.invalid_data += 1,
                SkipReason::InvalidPrice { .. } => summary.invalid_price += 1,
            }
        }

        Report {
            generated_at,
            summary,
            market_context: None,
            entries,
            skipped,
        }
    }
}
