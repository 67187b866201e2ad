use crate::normalize::NormalizedMetrics;
use crate::types::{CostFactors, DivisionMetadata};

/// Weighted sum of the five weighted sub-scores, before any boost.
pub fn base_score(normalized: &NormalizedMetrics, factors: &CostFactors) -> f64 {
    normalized.stars * factors.stars_weight()
        + normalized.commits * factors.commit_activity_weight()
        + normalized.build_time * factors.build_time_weight()
        + normalized.size * factors.size_weight()
        + normalized.test_coverage * factors.test_coverage_weight()
}

/// Raw score: the base score multiplied by the repository's manual boost and
/// the division's priority boost. Not clamped; values above 1.0 are what
/// trigger architectural reorganization.
pub fn weighted_score(
    normalized: &NormalizedMetrics,
    factors: &CostFactors,
    division: &DivisionMetadata,
) -> f64 {
    let boosted = base_score(normalized, factors) * factors.manual_boost();
    boosted * division.priority_boost()
}

/// Clamp a raw score to [0, 1], scale to 0-100 and round to one decimal.
pub fn normalize_final_score(raw_score: f64) -> f64 {
    round1(raw_score.clamp(0.0, 1.0) * 100.0)
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
