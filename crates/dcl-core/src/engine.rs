use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::DivisionCache;
use crate::compliance;
use crate::config::Config;
use crate::error::CostError;
use crate::governance;
use crate::normalize::{self, NormalizedMetrics};
use crate::scoring;
use crate::types::{
    CostFactors, Division, DivisionMetadata, ProjectStatus, RepositoryConfig, RepositoryMetrics,
};

/// Cost and governance outcome for one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostCalculationResult {
    pub repository: String,
    pub division: Division,
    pub status: ProjectStatus,
    pub raw_metrics: RepositoryMetrics,
    pub cost_factors: CostFactors,
    pub sub_scores: NormalizedMetrics,
    /// Unclamped weighted score; may exceed 1.0.
    pub calculated_score: f64,
    /// `calculated_score` clamped to [0, 1], scaled to 0-100, one decimal.
    pub normalized_score: f64,
    pub governance_alerts: Vec<String>,
    pub sinphase_violations: Vec<String>,
    /// Isolation was demanded by the repository's own config.
    #[serde(default)]
    pub isolation_declared: bool,
    pub requires_isolation: bool,
}

impl CostCalculationResult {
    /// Re-derive the isolation decision from the stored score and violations.
    pub fn isolation_decision(&self, division: &DivisionMetadata) -> bool {
        requires_isolation(
            self.calculated_score,
            division,
            &self.sinphase_violations,
            self.isolation_declared,
        )
    }

    pub fn alert_count(&self) -> usize {
        self.governance_alerts.len() + self.sinphase_violations.len()
    }
}

fn requires_isolation(
    raw_score: f64,
    division: &DivisionMetadata,
    sinphase_violations: &[String],
    isolation_declared: bool,
) -> bool {
    governance::crosses_isolation(raw_score, division)
        || !sinphase_violations.is_empty()
        || isolation_declared
}

/// Scores repositories against division governance parameters.
///
/// The engine is deterministic for its lifetime: commit recency is measured
/// against the instant captured at construction, and division metadata is
/// cached on first use.
#[derive(Debug)]
pub struct CostEngine {
    divisions: DivisionCache,
    defaults: RepositoryConfig,
    as_of: DateTime<Utc>,
}

impl Default for CostEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CostEngine {
    pub fn new() -> Self {
        Self {
            divisions: DivisionCache::new(),
            defaults: RepositoryConfig::default(),
            as_of: Utc::now(),
        }
    }

    /// Engine using the divisions and default cost factors from `config`.
    pub fn from_config(config: &Config) -> Result<Self, CostError> {
        let metadata = config.division_metadata()?;
        let defaults = RepositoryConfig {
            cost_factors: config.cost_factors()?,
            ..RepositoryConfig::default()
        };
        Ok(Self {
            divisions: DivisionCache::with_metadata(metadata),
            defaults,
            as_of: Utc::now(),
        })
    }

    /// Measure commit recency against a fixed instant instead of "now".
    pub fn with_as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = as_of;
        self
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    pub fn divisions(&self) -> &DivisionCache {
        &self.divisions
    }

    /// The config a repository is scored with: its own, or the defaults.
    pub fn effective_config<'a>(
        &'a self,
        config: Option<&'a RepositoryConfig>,
    ) -> &'a RepositoryConfig {
        config.unwrap_or(&self.defaults)
    }

    /// Score one repository. A malformed metrics record fails the whole
    /// calculation; there is never a partial result.
    pub fn calculate_repository_cost(
        &self,
        metrics: &RepositoryMetrics,
        config: Option<&RepositoryConfig>,
    ) -> Result<CostCalculationResult, CostError> {
        let config = self.effective_config(config);
        let division = self.divisions.get(config.division);

        metrics.validate()?;
        let sub_scores = normalize::normalize_metrics(metrics, self.as_of);
        let raw_score = scoring::weighted_score(&sub_scores, &config.cost_factors, &division);
        if !raw_score.is_finite() {
            return Err(CostError::Calculation {
                repository: metrics.name.clone(),
                reason: format!("weighted score is not finite ({raw_score})"),
            });
        }

        let governance_alerts = governance::classify(raw_score, &division);
        let sinphase_violations = compliance::check(metrics, config, raw_score);
        let normalized_score = scoring::normalize_final_score(raw_score);
        let requires_isolation = requires_isolation(
            raw_score,
            &division,
            &sinphase_violations,
            config.isolation_required,
        );

        Ok(CostCalculationResult {
            repository: metrics.name.clone(),
            division: config.division,
            status: config.status,
            raw_metrics: metrics.clone(),
            cost_factors: config.cost_factors.clone(),
            sub_scores,
            calculated_score: raw_score,
            normalized_score,
            governance_alerts,
            sinphase_violations,
            isolation_declared: config.isolation_required,
            requires_isolation,
        })
    }
}
