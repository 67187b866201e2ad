use colored::Colorize;

use dcl_core::aggregate::{DivisionSummary, OrganizationCostReport};
use dcl_core::engine::CostCalculationResult;

/// Format a full organization report for terminal output.
pub fn format_report(report: &OrganizationCostReport) -> String {
    let mut out = String::new();

    // Header
    out.push_str(&format!("\n{}\n", "dcl - Organization Cost Report".bold()));
    out.push_str(&format!("{}\n\n", "=".repeat(40)));

    out.push_str(&format!("{}: {}\n", "Organization".bold(), report.organization));
    out.push_str(&format!(
        "{}: {}\n",
        "Generated".bold(),
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!(
        "{}: {} of {} repositories analyzed\n",
        "Summary".bold(),
        report.analyzed_repositories,
        report.total_repositories,
    ));

    // Governance
    out.push_str(&format!("\n{}\n{}\n", "Governance".bold(), "-".repeat(40)));
    out.push_str(&format!(
        "  Governance alerts:     {}\n",
        report.governance_violation_count()
    ));
    out.push_str(&format!(
        "  Sinphasé violations:   {}\n",
        report.sinphase_violation_count()
    ));
    out.push_str(&format!(
        "  Isolation candidates:  {}\n",
        report.isolation_candidate_count()
    ));
    out.push_str(&format!(
        "  Compliance rate:       {}\n",
        format_rate(report.sinphase_compliance_rate)
    ));

    // Divisions
    if report.division_summaries.is_empty() {
        out.push_str(&format!("\n{}\n", "No repositories analyzed.".yellow()));
    } else {
        out.push_str(&format!("\n{}\n{}\n", "Divisions".bold(), "-".repeat(40)));
        out.push_str(&format!(
            "  {:<20} {:>6} {:>9} {:>7} {:>10}\n",
            "Division", "Repos", "Avg Cost", "Alerts", "Isolation"
        ));
        for summary in report.division_summaries.values() {
            let line = format!(
                "  {:<20} {:>6} {:>9.1} {:>7} {:>10}",
                summary.division.name(),
                summary.total_repositories,
                summary.average_cost_score,
                summary.governance_violations,
                summary.isolation_candidates,
            );
            if summary.isolation_candidates > 0 {
                out.push_str(&format!("{}\n", line.red()));
            } else if summary.governance_violations > 0 {
                out.push_str(&format!("{}\n", line.yellow()));
            } else {
                out.push_str(&format!("{line}\n"));
            }
        }
    }

    if let Some(ref fingerprint) = report.config_fingerprint {
        out.push_str(&format!("\n{}: {}\n", "Config".dimmed(), fingerprint.dimmed()));
    }

    out.push('\n');
    out
}

fn format_rate(rate: f64) -> String {
    let rate_str = format!("{:.1}%", rate * 100.0);
    if rate >= 0.9 {
        rate_str.green().to_string()
    } else if rate >= 0.7 {
        rate_str.yellow().to_string()
    } else {
        rate_str.red().to_string()
    }
}

/// Repositories ranked by normalized score. Isolation candidates are red,
/// repositories with governance alerts yellow.
pub fn format_repository_table(report: &OrganizationCostReport, verbose: bool) -> String {
    let mut out = String::new();

    let mut ranked: Vec<&CostCalculationResult> = report.repository_scores.iter().collect();
    ranked.sort_by(|a, b| b.normalized_score.total_cmp(&a.normalized_score));

    out.push_str(&format!(
        "\n{} ({} repositories)\n",
        "Repository Cost Scores".bold(),
        ranked.len()
    ));

    let mut header = format!(
        "  {:<30} {:<20} {:<12} {:>6}",
        "Repository", "Division", "Status", "Cost"
    );
    if verbose {
        header.push_str(&format!(" {:>7} {:>8} {:>7}", "Stars", "Commits", "Alerts"));
    }
    out.push_str(&format!("{}\n{}\n", header.bold(), "-".repeat(header.len())));

    for result in ranked {
        let mut line = format!(
            "  {:<30} {:<20} {:<12} {:>6.1}",
            result.repository,
            result.division.name(),
            result.status.name(),
            result.normalized_score,
        );
        if verbose {
            line.push_str(&format!(
                " {:>7} {:>8} {:>7}",
                result.raw_metrics.stars_count,
                result.raw_metrics.commits_last_30_days,
                result.alert_count(),
            ));
        }

        if result.requires_isolation {
            out.push_str(&format!("{}\n", line.red()));
        } else if !result.governance_alerts.is_empty() {
            out.push_str(&format!("{}\n", line.yellow()));
        } else {
            out.push_str(&format!("{line}\n"));
        }
    }

    out
}

/// One block per division with its status mix and top repositories.
pub fn format_division_summary(report: &OrganizationCostReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "\n{}\n{}\n",
        "Division Summary".bold(),
        "=".repeat(40)
    ));

    if report.division_summaries.is_empty() {
        out.push_str("No repositories analyzed.\n");
        return out;
    }

    for summary in report.division_summaries.values() {
        out.push_str(&format_division_block(summary));
    }
    out
}

fn format_division_block(summary: &DivisionSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", summary.division.name().bold().cyan()));
    out.push_str(&format!(
        "  Repositories: {}  Avg cost: {:.1}\n",
        summary.total_repositories, summary.average_cost_score
    ));

    let statuses: Vec<String> = summary
        .status_distribution
        .iter()
        .map(|(status, count)| format!("{status}: {count}"))
        .collect();
    out.push_str(&format!("  Status: {}\n", statuses.join(", ")));

    if summary.governance_violations > 0 {
        out.push_str(&format!(
            "  {}: {}\n",
            "Governance alerts".yellow(),
            summary.governance_violations
        ));
    }
    if summary.isolation_candidates > 0 {
        out.push_str(&format!(
            "  {}: {}\n",
            "Isolation candidates".red(),
            summary.isolation_candidates
        ));
    }

    if !summary.top_repositories.is_empty() {
        out.push_str("  Top repositories:\n");
        for (rank, name) in summary.top_repositories.iter().enumerate() {
            out.push_str(&format!("    {}. {name}\n", rank + 1));
        }
    }
    out
}

/// Format a check result for CI use. Returns (text, passed).
pub fn format_check(report: &OrganizationCostReport, max_isolation: usize) -> (String, bool) {
    let candidates = report.isolation_candidate_count();
    let passed = candidates <= max_isolation;

    let mut out = format_report(report);

    if passed {
        out.push_str(&format!("{}\n", "CHECK PASSED".green().bold()));
    } else {
        out.push_str(&format!(
            "{}: {} isolation candidate(s), at most {} allowed\n",
            "CHECK FAILED".red().bold(),
            candidates,
            max_isolation,
        ));
        for result in report.repository_scores.iter().filter(|r| r.requires_isolation) {
            out.push_str(&format!("  - {} ({})\n", result.repository, result.division));
        }
    }

    (out, passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{empty_report, sample_report};

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_format_report_counts() {
        plain();
        let text = format_report(&sample_report());
        assert!(text.contains("Organization: obinexus"));
        assert!(text.contains("3 of 3 repositories analyzed"));
        assert!(text.contains("Governance alerts:     3"));
        assert!(text.contains("Sinphasé violations:   1"));
        assert!(text.contains("Isolation candidates:  2"));
        assert!(text.contains("66.7%"));
        assert!(text.contains("Computing"));
        assert!(text.contains("Publishing"));
    }

    #[test]
    fn test_format_report_empty() {
        plain();
        let text = format_report(&empty_report());
        assert!(text.contains("No repositories analyzed."));
        assert!(text.contains("100.0%"));
    }

    #[test]
    fn test_repository_table_sorted_by_score() {
        plain();
        let text = format_repository_table(&sample_report(), false);
        let hot = text.find("libpolycall").unwrap();
        let quiet = text.find("quiet-docs").unwrap();
        assert!(hot < quiet);
        assert!(text.contains("100.0"));
        assert!(!text.contains("Stars"));
    }

    #[test]
    fn test_repository_table_verbose_columns() {
        plain();
        let text = format_repository_table(&sample_report(), true);
        assert!(text.contains("Stars"));
        assert!(text.contains("Commits"));
        assert!(text.contains("1000"));
    }

    #[test]
    fn test_division_summary_lists_top_repositories() {
        plain();
        let text = format_division_summary(&sample_report());
        assert!(text.contains("Computing"));
        assert!(text.contains("1. libpolycall"));
        assert!(text.contains("2. slow-build"));
        assert!(text.contains("Core: 1"));
        assert!(text.contains("Legacy: 1"));
    }

    #[test]
    fn test_format_check_fails_over_limit() {
        plain();
        let (text, passed) = format_check(&sample_report(), 1);
        assert!(!passed);
        assert!(text.contains("CHECK FAILED"));
        assert!(text.contains("- libpolycall (Computing)"));
    }

    #[test]
    fn test_format_check_passes_within_limit() {
        plain();
        let (text, passed) = format_check(&sample_report(), 2);
        assert!(passed);
        assert!(text.contains("CHECK PASSED"));
    }
}
