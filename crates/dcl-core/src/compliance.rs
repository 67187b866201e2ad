use crate::types::{RepositoryConfig, RepositoryMetrics};

const COMPLEXITY_SIZE_KB: u64 = 100_000;
const COMPLEXITY_SCORE: f64 = 0.8;
const SINGLE_PASS_BUILD_MINUTES: f64 = 30.0;
const COUPLING_COMMITS: u64 = 200;
const COUPLING_DEPENDENCIES: usize = 10;

/// Heuristic Sinphasé rules. Each is evaluated independently of the others
/// and of the governance thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinphaseRule {
    /// The repository's own config declares it non-compliant.
    ExplicitNonCompliance,
    /// Large and high-scoring: likely tangled dependencies.
    CircularComplexity,
    /// Builds too slow to be single-pass.
    BuildComplexity,
    /// High churn across many dependencies.
    TemporalCoupling,
}

impl SinphaseRule {
    pub const ALL: [SinphaseRule; 4] = [
        SinphaseRule::ExplicitNonCompliance,
        SinphaseRule::CircularComplexity,
        SinphaseRule::BuildComplexity,
        SinphaseRule::TemporalCoupling,
    ];

    pub fn message(&self) -> &'static str {
        match self {
            SinphaseRule::ExplicitNonCompliance => "Explicit Sinphasé non-compliance declared",
            SinphaseRule::CircularComplexity => "Potential circular dependency complexity detected",
            SinphaseRule::BuildComplexity => "Build complexity exceeds single-pass threshold",
            SinphaseRule::TemporalCoupling => "High temporal coupling risk detected",
        }
    }

    pub fn is_violated(
        &self,
        metrics: &RepositoryMetrics,
        config: &RepositoryConfig,
        raw_score: f64,
    ) -> bool {
        match self {
            SinphaseRule::ExplicitNonCompliance => !config.sinphase_compliance,
            SinphaseRule::CircularComplexity => {
                metrics.size_kb > COMPLEXITY_SIZE_KB && raw_score > COMPLEXITY_SCORE
            }
            SinphaseRule::BuildComplexity => metrics
                .build_time_minutes
                .is_some_and(|minutes| minutes > SINGLE_PASS_BUILD_MINUTES),
            SinphaseRule::TemporalCoupling => {
                metrics.commits_last_30_days > COUPLING_COMMITS
                    && config.dependencies.len() > COUPLING_DEPENDENCIES
            }
        }
    }
}

/// Rules the repository breaks, in rule order.
pub fn violated_rules(
    metrics: &RepositoryMetrics,
    config: &RepositoryConfig,
    raw_score: f64,
) -> Vec<SinphaseRule> {
    SinphaseRule::ALL
        .into_iter()
        .filter(|rule| rule.is_violated(metrics, config, raw_score))
        .collect()
}

/// Sinphasé violation messages for one repository.
pub fn check(metrics: &RepositoryMetrics, config: &RepositoryConfig, raw_score: f64) -> Vec<String> {
    violated_rules(metrics, config, raw_score)
        .into_iter()
        .map(|rule| rule.message().to_string())
        .collect()
}
