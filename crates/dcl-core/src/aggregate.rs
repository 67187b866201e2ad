use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::CostCalculationResult;
use crate::scoring::round1;
use crate::types::{Division, ProjectStatus};

/// Number of repository names kept per division ranking.
pub const TOP_REPOSITORY_LIMIT: usize = 5;

/// Aggregated view of one division's repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionSummary {
    pub division: Division,
    pub total_repositories: usize,
    pub average_cost_score: f64,
    pub status_distribution: BTreeMap<ProjectStatus, usize>,
    pub governance_violations: usize,
    pub isolation_candidates: usize,
    pub top_repositories: Vec<String>,
}

/// Organization-wide cost report.
///
/// Built empty, filled with one result per repository, then finalized once
/// with [`OrganizationCostReport::finalize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationCostReport {
    pub organization: String,
    pub generated_at: DateTime<Utc>,
    pub total_repositories: usize,
    pub analyzed_repositories: usize,
    pub repository_scores: Vec<CostCalculationResult>,
    pub division_summaries: BTreeMap<Division, DivisionSummary>,
    pub sinphase_compliance_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_fingerprint: Option<String>,
}

impl OrganizationCostReport {
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            generated_at: Utc::now(),
            total_repositories: 0,
            analyzed_repositories: 0,
            repository_scores: Vec::new(),
            division_summaries: BTreeMap::new(),
            sinphase_compliance_rate: 1.0,
            config_fingerprint: None,
        }
    }

    /// Append one repository's result.
    pub fn push(&mut self, result: CostCalculationResult) {
        self.repository_scores.push(result);
        self.analyzed_repositories = self.repository_scores.len();
        self.total_repositories = self.total_repositories.max(self.analyzed_repositories);
    }

    /// Compute division summaries and the compliance rate.
    pub fn finalize(&mut self) {
        generate_division_summaries(self);
        calculate_governance_metrics(self);
    }

    pub fn governance_violation_count(&self) -> usize {
        self.repository_scores
            .iter()
            .map(|r| r.governance_alerts.len())
            .sum()
    }

    pub fn sinphase_violation_count(&self) -> usize {
        self.repository_scores
            .iter()
            .map(|r| r.sinphase_violations.len())
            .sum()
    }

    pub fn isolation_candidate_count(&self) -> usize {
        self.repository_scores
            .iter()
            .filter(|r| r.requires_isolation)
            .count()
    }

    /// Narrow the report to one division. Counts, summaries and the
    /// compliance rate are recomputed from the remaining results.
    pub fn retain_division(&mut self, division: Division) {
        self.repository_scores.retain(|r| r.division == division);
        self.analyzed_repositories = self.repository_scores.len();
        self.total_repositories = self.analyzed_repositories;
        self.sinphase_compliance_rate = 1.0;
        self.finalize();
    }
}

/// Rebuild `report.division_summaries` from `report.repository_scores`.
pub fn generate_division_summaries(report: &mut OrganizationCostReport) {
    let mut groups: BTreeMap<Division, Vec<&CostCalculationResult>> = BTreeMap::new();
    for result in &report.repository_scores {
        groups.entry(result.division).or_default().push(result);
    }

    let summaries = groups
        .into_iter()
        .map(|(division, results)| (division, summarize_division(division, &results)))
        .collect();
    report.division_summaries = summaries;
}

fn summarize_division(division: Division, results: &[&CostCalculationResult]) -> DivisionSummary {
    let total = results.len();
    let score_sum: f64 = results.iter().map(|r| r.normalized_score).sum();
    let average = if total == 0 {
        0.0
    } else {
        round1(score_sum / total as f64)
    };

    let mut status_distribution = BTreeMap::new();
    for result in results {
        *status_distribution.entry(result.status).or_insert(0) += 1;
    }

    // Stable sort: equal scores keep input order
    let mut ranked = results.to_vec();
    ranked.sort_by(|a, b| b.normalized_score.total_cmp(&a.normalized_score));
    let top_repositories = ranked
        .iter()
        .take(TOP_REPOSITORY_LIMIT)
        .map(|r| r.repository.clone())
        .collect();

    DivisionSummary {
        division,
        total_repositories: total,
        average_cost_score: average,
        status_distribution,
        governance_violations: results.iter().map(|r| r.governance_alerts.len()).sum(),
        isolation_candidates: results.iter().filter(|r| r.requires_isolation).count(),
        top_repositories,
    }
}

/// Update the organization-wide Sinphasé compliance rate. An empty report
/// keeps its previous rate.
pub fn calculate_governance_metrics(report: &mut OrganizationCostReport) {
    let total = report.repository_scores.len();
    if total == 0 {
        return;
    }
    let violations = report.sinphase_violation_count();
    let rate = 1.0 - violations as f64 / total as f64;
    report.sinphase_compliance_rate = rate.max(0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NormalizedMetrics;
    use crate::types::{CostFactors, RepositoryMetrics};

    fn make_result(name: &str, division: Division, score: f64) -> CostCalculationResult {
        CostCalculationResult {
            repository: name.to_string(),
            division,
            status: ProjectStatus::Active,
            raw_metrics: RepositoryMetrics::new(name),
            cost_factors: CostFactors::default(),
            sub_scores: NormalizedMetrics {
                stars: 0.0,
                commits: 0.0,
                size: 0.0,
                build_time: 0.5,
                test_coverage: 0.0,
                language_diversity: 0.0,
            },
            calculated_score: score / 100.0,
            normalized_score: score,
            governance_alerts: vec![],
            sinphase_violations: vec![],
            isolation_declared: false,
            requires_isolation: false,
        }
    }

    #[test]
    fn test_empty_report() {
        let mut report = OrganizationCostReport::new("obinexus");
        report.finalize();
        assert!(report.division_summaries.is_empty());
        assert_eq!(report.sinphase_compliance_rate, 1.0);
    }

    #[test]
    fn test_average_and_ranking() {
        let mut report = OrganizationCostReport::new("obinexus");
        report.push(make_result("low", Division::Computing, 20.0));
        report.push(make_result("high", Division::Computing, 80.0));
        report.finalize();

        let summary = &report.division_summaries[&Division::Computing];
        assert_eq!(summary.total_repositories, 2);
        assert_eq!(summary.average_cost_score, 50.0);
        assert_eq!(summary.top_repositories, vec!["high", "low"]);
        assert_eq!(summary.status_distribution[&ProjectStatus::Active], 2);
    }

    #[test]
    fn test_groups_by_division() {
        let mut report = OrganizationCostReport::new("obinexus");
        report.push(make_result("a", Division::Computing, 10.0));
        report.push(make_result("b", Division::Publishing, 30.0));
        report.push(make_result("c", Division::Computing, 40.0));
        report.finalize();

        assert_eq!(report.division_summaries.len(), 2);
        assert_eq!(
            report.division_summaries[&Division::Computing].total_repositories,
            2
        );
        assert_eq!(
            report.division_summaries[&Division::Publishing].average_cost_score,
            30.0
        );
    }

    #[test]
    fn test_top_repositories_limited_and_stable() {
        let mut report = OrganizationCostReport::new("obinexus");
        for (i, score) in [50.0, 70.0, 50.0, 10.0, 70.0, 50.0, 90.0].iter().enumerate() {
            report.push(make_result(&format!("r{i}"), Division::Tda, *score));
        }
        report.finalize();

        let top = &report.division_summaries[&Division::Tda].top_repositories;
        assert_eq!(top, &vec!["r6", "r1", "r4", "r0", "r2"]);
    }

    #[test]
    fn test_violation_and_isolation_counts() {
        let mut flagged = make_result("flagged", Division::Computing, 100.0);
        flagged.governance_alerts = vec!["g".to_string(), "i".to_string(), "r".to_string()];
        flagged.sinphase_violations = vec!["s".to_string()];
        flagged.requires_isolation = true;

        let mut report = OrganizationCostReport::new("obinexus");
        report.push(flagged);
        report.push(make_result("calm", Division::Computing, 5.0));
        report.finalize();

        let summary = &report.division_summaries[&Division::Computing];
        assert_eq!(summary.governance_violations, 3);
        assert_eq!(summary.isolation_candidates, 1);
        assert_eq!(report.sinphase_compliance_rate, 0.5);
    }

    #[test]
    fn test_compliance_rate_clamped_at_zero() {
        let mut noisy = make_result("noisy", Division::Computing, 60.0);
        noisy.sinphase_violations = vec!["a".into(), "b".into(), "c".into()];
        let mut report = OrganizationCostReport::new("obinexus");
        report.push(noisy);
        calculate_governance_metrics(&mut report);
        assert_eq!(report.sinphase_compliance_rate, 0.0);
    }

    #[test]
    fn test_regeneration_replaces_stale_summaries() {
        let mut report = OrganizationCostReport::new("obinexus");
        report.push(make_result("a", Division::Computing, 10.0));
        report.push(make_result("b", Division::Publishing, 30.0));
        report.finalize();

        report.retain_division(Division::Publishing);
        assert_eq!(report.division_summaries.len(), 1);
        assert!(report.division_summaries.contains_key(&Division::Publishing));
    }

    #[test]
    fn test_retain_division_recomputes_totals() {
        let mut noisy = make_result("noisy", Division::Computing, 90.0);
        noisy.sinphase_violations = vec!["s".to_string()];
        let mut report = OrganizationCostReport::new("obinexus");
        report.push(noisy);
        report.push(make_result("quiet", Division::Publishing, 10.0));
        report.total_repositories = 4;
        report.finalize();
        assert_eq!(report.sinphase_compliance_rate, 0.5);

        report.retain_division(Division::Publishing);
        assert_eq!(report.total_repositories, 1);
        assert_eq!(report.analyzed_repositories, 1);
        assert_eq!(report.sinphase_compliance_rate, 1.0);
        assert_eq!(report.sinphase_violation_count(), 0);

        report.retain_division(Division::Tda);
        assert_eq!(report.total_repositories, 0);
        assert!(report.division_summaries.is_empty());
        assert_eq!(report.sinphase_compliance_rate, 1.0);
    }

    #[test]
    fn test_report_serializes_division_keys_by_name() {
        let mut report = OrganizationCostReport::new("obinexus");
        report.push(make_result("a", Division::AegisEngineering, 10.0));
        report.finalize();

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["division_summaries"]["Aegis Engineering"].is_object());
        let back: OrganizationCostReport = serde_json::from_value(json).unwrap();
        assert_eq!(back.division_summaries, report.division_summaries);
        assert_eq!(back.repository_scores[0].division, Division::AegisEngineering);
    }
}
