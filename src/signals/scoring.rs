//! Score normalization helpers

use crate::common::math;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;

/// Clip a raw score into `[0, 10]`
pub fn clip_score(value: f64) -> f64 {
    math::clamp(value, SCORE_MIN, SCORE_MAX)
}

/// Linear interpolation of `value` from `[from, to]` onto
/// `[score_from, score_to]`, clipped to the end points
pub fn interpolate(value: f64, from: f64, to: f64, score_from: f64, score_to: f64) -> f64 {
    if to == from {
        return score_to;
    }
    let t = math::clamp((value - from) / (to - from), 0.0, 1.0);
    score_from + t * (score_to - score_from)
}
