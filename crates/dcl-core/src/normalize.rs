use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::RepositoryMetrics;

const STARS_CEILING: f64 = 1000.0;
const COMMITS_CEILING: f64 = 100.0;
const SIZE_CEILING_KB: f64 = 50_000.0;
/// A build this long or longer scores zero.
const BUILD_TIME_CEILING_MINUTES: f64 = 60.0;
const TEMPORAL_DECAY_FACTOR: f64 = 0.1;
const MIN_TEMPORAL_WEIGHT: f64 = 0.1;
/// Used when a metric is unknown, so it is neither rewarded nor penalized.
const NEUTRAL_SCORE: f64 = 0.5;
/// Roughly log2(5): five evenly split languages score 1.0.
const DIVERSITY_REFERENCE_BITS: f64 = 2.32;

/// Sub-scores of a repository, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMetrics {
    pub stars: f64,
    pub commits: f64,
    pub size: f64,
    pub build_time: f64,
    pub test_coverage: f64,
    /// Computed for reporting; not part of the weighted score.
    pub language_diversity: f64,
}

/// Map raw metrics onto bounded sub-scores. `as_of` is the instant commit
/// recency is measured against.
pub fn normalize_metrics(metrics: &RepositoryMetrics, as_of: DateTime<Utc>) -> NormalizedMetrics {
    let temporal = temporal_weight(metrics.last_commit_date, as_of);

    NormalizedMetrics {
        stars: ratio(metrics.stars_count as f64, STARS_CEILING),
        commits: ratio(metrics.commits_last_30_days as f64, COMMITS_CEILING) * temporal,
        size: ratio(metrics.size_kb as f64, SIZE_CEILING_KB),
        build_time: normalize_build_time(metrics.build_time_minutes),
        test_coverage: (metrics.test_coverage_percent.unwrap_or(0.0) / 100.0).clamp(0.0, 1.0),
        language_diversity: language_diversity(&metrics.languages),
    }
}

fn ratio(value: f64, ceiling: f64) -> f64 {
    (value / ceiling).min(1.0)
}

/// Exponential decay on days since the last commit, bounded to [0.1, 1.0].
pub fn temporal_weight(last_commit: Option<DateTime<Utc>>, as_of: DateTime<Utc>) -> f64 {
    let Some(last_commit) = last_commit else {
        return NEUTRAL_SCORE;
    };

    // Commits dated after `as_of` count as fresh
    let days = (as_of - last_commit).num_days().max(0) as f64;
    let decay = (-days * TEMPORAL_DECAY_FACTOR / 365.0).exp();
    decay.clamp(MIN_TEMPORAL_WEIGHT, 1.0)
}

/// Faster builds score higher.
pub fn normalize_build_time(build_time_minutes: Option<f64>) -> f64 {
    match build_time_minutes {
        None => NEUTRAL_SCORE,
        Some(minutes) => (1.0 - minutes / BUILD_TIME_CEILING_MINUTES).clamp(0.0, 1.0),
    }
}

/// Shannon entropy of the byte distribution across languages, scaled so
/// that five evenly used languages reach 1.0.
pub fn language_diversity(languages: &BTreeMap<String, u64>) -> f64 {
    if languages.len() <= 1 {
        return 0.0;
    }

    let total: u64 = languages.values().sum();
    if total == 0 {
        return 0.0;
    }

    let entropy: f64 = languages
        .values()
        .filter(|&&bytes| bytes > 0)
        .map(|&bytes| {
            let p = bytes as f64 / total as f64;
            -p * p.log2()
        })
        .sum();

    (entropy / DIVERSITY_REFERENCE_BITS).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn languages(entries: &[(&str, u64)]) -> BTreeMap<String, u64> {
        entries
            .iter()
            .map(|(name, bytes)| (name.to_string(), *bytes))
            .collect()
    }

    #[test]
    fn test_zero_activity_repository() {
        let metrics = RepositoryMetrics::new("empty");
        let normalized = normalize_metrics(&metrics, as_of());
        assert_eq!(normalized.stars, 0.0);
        assert_eq!(normalized.commits, 0.0);
        assert_eq!(normalized.size, 0.0);
        assert_eq!(normalized.build_time, 0.5, "unknown build time is neutral");
        assert_eq!(normalized.test_coverage, 0.0);
        assert_eq!(normalized.language_diversity, 0.0);
    }

    #[test]
    fn test_ceilings_cap_at_one() {
        let mut metrics = RepositoryMetrics::new("huge");
        metrics.stars_count = 10_000_000;
        metrics.commits_last_30_days = 5_000;
        metrics.size_kb = 9_000_000;
        metrics.last_commit_date = Some(as_of());
        let normalized = normalize_metrics(&metrics, as_of());
        assert_eq!(normalized.stars, 1.0);
        assert_eq!(normalized.commits, 1.0);
        assert_eq!(normalized.size, 1.0);
    }

    #[test]
    fn test_linear_ratios() {
        let mut metrics = RepositoryMetrics::new("mid");
        metrics.stars_count = 250;
        metrics.size_kb = 25_000;
        metrics.test_coverage_percent = Some(85.0);
        let normalized = normalize_metrics(&metrics, as_of());
        assert!((normalized.stars - 0.25).abs() < 1e-12);
        assert!((normalized.size - 0.5).abs() < 1e-12);
        assert!((normalized.test_coverage - 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_commit_date_halves_commit_score() {
        let mut metrics = RepositoryMetrics::new("undated");
        metrics.commits_last_30_days = 50;
        let normalized = normalize_metrics(&metrics, as_of());
        assert!((normalized.commits - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_temporal_weight_decay() {
        assert_eq!(temporal_weight(Some(as_of()), as_of()), 1.0);

        let one_year = temporal_weight(Some(as_of() - Duration::days(365)), as_of());
        assert!((one_year - (-0.1f64).exp()).abs() < 1e-12);

        let ancient = temporal_weight(Some(as_of() - Duration::days(365 * 100)), as_of());
        assert_eq!(ancient, 0.1, "decay is floored at 0.1");

        let future = temporal_weight(Some(as_of() + Duration::days(3)), as_of());
        assert_eq!(future, 1.0);
    }

    #[test]
    fn test_build_time_inverse() {
        assert_eq!(normalize_build_time(None), 0.5);
        assert_eq!(normalize_build_time(Some(0.0)), 1.0);
        assert!((normalize_build_time(Some(15.0)) - 0.75).abs() < 1e-12);
        assert_eq!(normalize_build_time(Some(60.0)), 0.0);
        assert_eq!(normalize_build_time(Some(240.0)), 0.0);
    }

    #[test]
    fn test_language_diversity_single_or_empty() {
        assert_eq!(language_diversity(&BTreeMap::new()), 0.0);
        assert_eq!(language_diversity(&languages(&[("C", 5000)])), 0.0);
        assert_eq!(language_diversity(&languages(&[("C", 0), ("Rust", 0)])), 0.0);
    }

    #[test]
    fn test_language_diversity_even_split() {
        let two = language_diversity(&languages(&[("C", 100), ("Rust", 100)]));
        assert!((two - 1.0 / 2.32).abs() < 1e-12);

        let eight = language_diversity(&languages(&[
            ("A", 10),
            ("B", 10),
            ("C", 10),
            ("D", 10),
            ("E", 10),
            ("F", 10),
            ("G", 10),
            ("H", 10),
        ]));
        assert_eq!(eight, 1.0, "capped at 1.0");
    }

    #[test]
    fn test_language_diversity_skewed_lower_than_even() {
        let skewed = language_diversity(&languages(&[("C", 9_000), ("Python", 1_000)]));
        let even = language_diversity(&languages(&[("C", 5_000), ("Python", 5_000)]));
        assert!(skewed > 0.0);
        assert!(skewed < even);
    }

    #[test]
    fn test_all_sub_scores_bounded() {
        let mut metrics = RepositoryMetrics::new("bounded");
        metrics.stars_count = u64::MAX;
        metrics.commits_last_30_days = u64::MAX;
        metrics.size_kb = u64::MAX;
        metrics.build_time_minutes = Some(0.0);
        metrics.test_coverage_percent = Some(100.0);
        metrics.languages = languages(&[("C", u64::MAX / 4), ("Rust", u64::MAX / 4)]);
        let normalized = normalize_metrics(&metrics, as_of());
        for (name, value) in [
            ("stars", normalized.stars),
            ("commits", normalized.commits),
            ("size", normalized.size),
            ("build_time", normalized.build_time),
            ("test_coverage", normalized.test_coverage),
            ("language_diversity", normalized.language_diversity),
        ] {
            assert!((0.0..=1.0).contains(&value), "{name} out of range: {value}");
        }
    }
}
