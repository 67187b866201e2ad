use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use dcl_core::aggregate::OrganizationCostReport;
use dcl_core::config::load_repository_overrides;
use dcl_core::pipeline::RepositoryRecord;

/// A metrics export: the repositories of one organization as collected from
/// GitHub, each with optional inline config.
#[derive(Debug, Deserialize)]
pub struct MetricsBatch {
    #[serde(default)]
    pub organization: Option<String>,
    pub repositories: Vec<RepositoryRecord>,
}

pub fn read_metrics(path: &Path) -> Result<MetricsBatch> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read metrics file '{}'", path.display()))?;
    let batch: MetricsBatch = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse metrics file '{}'", path.display()))?;
    debug!(
        repositories = batch.repositories.len(),
        "loaded metrics from {}",
        path.display()
    );
    Ok(batch)
}

/// Replace inline configs with `<repository>.toml` files from `dir`.
/// Unreadable override files are logged and ignored.
pub fn apply_overrides(records: &mut [RepositoryRecord], dir: &Path) -> Result<()> {
    let mut overrides = load_repository_overrides(dir)?;
    for (path, reason) in &overrides.failures {
        warn!("skipping override file {}: {reason}", path.display());
    }

    for record in records.iter_mut() {
        if let Some(config) = overrides.configs.remove(&record.metrics.name) {
            debug!(repository = %record.metrics.name, "applying config override");
            record.config = Some(config);
        }
    }

    for name in overrides.configs.keys() {
        warn!("override for unknown repository '{name}' was not used");
    }
    Ok(())
}

pub fn read_report(path: &Path) -> Result<OrganizationCostReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read report '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse report '{}'", path.display()))
}

pub fn write_report(path: &Path, report: &OrganizationCostReport) -> Result<()> {
    let json = dcl_report::json::format_report(report, false);
    std::fs::write(path, json).with_context(|| format!("failed to write '{}'", path.display()))
}
