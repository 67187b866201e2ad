use chrono::{TimeZone, Utc};

use dcl_core::{
    CostEngine, CostFactors, CostPipeline, Division, OrganizationCostReport, ProjectStatus,
    RepositoryConfig, RepositoryMetrics, RepositoryRecord,
};

/// Three repositories: one quiet, one crossing every governance tier, one
/// with a slow build.
pub fn sample_report() -> OrganizationCostReport {
    let as_of = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let engine = CostEngine::new().with_as_of(as_of);

    let quiet = RepositoryRecord::new(RepositoryMetrics {
        stars_count: 3,
        commits_last_30_days: 1,
        size_kb: 120,
        ..RepositoryMetrics::new("quiet-docs")
    })
    .with_config(RepositoryConfig {
        division: Division::Publishing,
        status: ProjectStatus::Legacy,
        ..RepositoryConfig::default()
    });

    let hot = RepositoryRecord::new(RepositoryMetrics {
        stars_count: 1000,
        commits_last_30_days: 500,
        size_kb: 50_000,
        last_commit_date: Some(as_of),
        ..RepositoryMetrics::new("libpolycall")
    })
    .with_config(RepositoryConfig {
        division: Division::Computing,
        status: ProjectStatus::Core,
        cost_factors: CostFactors::default().with_manual_boost(2.0).unwrap(),
        ..RepositoryConfig::default()
    });

    let slow = RepositoryRecord::new(RepositoryMetrics {
        build_time_minutes: Some(45.0),
        ..RepositoryMetrics::new("slow-build")
    });

    CostPipeline::new(engine)
        .run("obinexus", &[quiet, hot, slow])
        .report
}

pub fn empty_report() -> OrganizationCostReport {
    let mut report = OrganizationCostReport::new("obinexus");
    report.finalize();
    report
}
