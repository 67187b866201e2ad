use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregate::OrganizationCostReport;
use crate::engine::{CostCalculationResult, CostEngine};
use crate::error::CostError;
use crate::types::{Division, RepositoryConfig, RepositoryMetrics};

/// One repository's input: its metrics and, optionally, its own config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub metrics: RepositoryMetrics,
    #[serde(default)]
    pub config: Option<RepositoryConfig>,
}

impl RepositoryRecord {
    pub fn new(metrics: RepositoryMetrics) -> Self {
        Self {
            metrics,
            config: None,
        }
    }

    pub fn with_config(mut self, config: RepositoryConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// Which records a batch run scores.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Only score repositories in this division.
    pub division: Option<Division>,
    /// Score archived repositories instead of skipping them.
    pub include_archived: bool,
}

/// A finalized report plus everything that did not make it into it.
#[derive(Debug)]
pub struct BatchOutcome {
    pub report: OrganizationCostReport,
    /// Repositories whose calculation failed, in input order.
    pub failures: Vec<CostError>,
    /// Archived repositories that were not scored.
    pub skipped: Vec<String>,
}

/// Scores a batch of repositories in parallel and aggregates the results.
pub struct CostPipeline {
    engine: CostEngine,
    options: BatchOptions,
    fingerprint: Option<String>,
}

impl CostPipeline {
    pub fn new(engine: CostEngine) -> Self {
        Self {
            engine,
            options: BatchOptions::default(),
            fingerprint: None,
        }
    }

    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Record which configuration produced the report.
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    /// Score every record and build the organization report. A failing
    /// repository is collected in `failures` and does not stop the batch.
    pub fn run(&self, organization: &str, records: &[RepositoryRecord]) -> BatchOutcome {
        // Lookups during the parallel phase only take the read lock
        self.engine.divisions().prepopulate();

        let mut skipped = Vec::new();
        let selected: Vec<&RepositoryRecord> = records
            .iter()
            .filter(|record| {
                if record.metrics.is_archived && !self.options.include_archived {
                    skipped.push(record.metrics.name.clone());
                    return false;
                }
                true
            })
            .filter(|record| match self.options.division {
                Some(division) => {
                    self.engine.effective_config(record.config.as_ref()).division == division
                }
                None => true,
            })
            .collect();

        let outcomes: Vec<Result<CostCalculationResult, CostError>> = selected
            .par_iter()
            .map(|record| {
                self.engine
                    .calculate_repository_cost(&record.metrics, record.config.as_ref())
            })
            .collect();

        let mut report = OrganizationCostReport::new(organization);
        report.generated_at = self.engine.as_of();
        report.config_fingerprint = self.fingerprint.clone();

        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(result) => report.push(result),
                Err(e) => failures.push(e),
            }
        }
        report.total_repositories = records.len();
        report.finalize();

        BatchOutcome {
            report,
            failures,
            skipped,
        }
    }
}
