use dcl_core::aggregate::OrganizationCostReport;

/// Format a full organization report as Markdown.
pub fn format_report(report: &OrganizationCostReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "# dcl - Organization Cost Report: {}\n\n",
        report.organization
    ));
    out.push_str(&format!(
        "_Generated {}_\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    // Summary
    out.push_str("\n## Summary\n\n");
    out.push_str("| Metric | Value |\n");
    out.push_str("|--------|-------|\n");
    out.push_str(&format!(
        "| Repositories analyzed | {} / {} |\n",
        report.analyzed_repositories, report.total_repositories
    ));
    out.push_str(&format!(
        "| Governance alerts | {} |\n",
        report.governance_violation_count()
    ));
    out.push_str(&format!(
        "| Sinphasé violations | {} |\n",
        report.sinphase_violation_count()
    ));
    out.push_str(&format!(
        "| Isolation candidates | {} |\n",
        report.isolation_candidate_count()
    ));
    out.push_str(&format!(
        "| **Compliance rate** | **{:.1}%** |\n",
        report.sinphase_compliance_rate * 100.0
    ));

    // Divisions
    if report.division_summaries.is_empty() {
        out.push_str("\n## Divisions\n\nNo repositories analyzed.\n");
    } else {
        out.push_str("\n## Divisions\n\n");
        out.push_str("| Division | Repositories | Avg Cost | Alerts | Isolation | Top Repositories |\n");
        out.push_str("|----------|--------------|----------|--------|-----------|------------------|\n");
        for summary in report.division_summaries.values() {
            out.push_str(&format!(
                "| {} | {} | {:.1} | {} | {} | {} |\n",
                summary.division,
                summary.total_repositories,
                summary.average_cost_score,
                summary.governance_violations,
                summary.isolation_candidates,
                summary.top_repositories.join(", "),
            ));
        }
    }

    // Flagged repositories
    let flagged: Vec<_> = report
        .repository_scores
        .iter()
        .filter(|r| r.alert_count() > 0 || r.requires_isolation)
        .collect();
    if !flagged.is_empty() {
        out.push_str(&format!(
            "\n## Flagged Repositories ({} found)\n\n",
            flagged.len()
        ));
        out.push_str("| Repository | Division | Cost | Isolation | Findings |\n");
        out.push_str("|------------|----------|------|-----------|----------|\n");
        for result in flagged {
            let findings: Vec<&str> = result
                .governance_alerts
                .iter()
                .chain(&result.sinphase_violations)
                .map(String::as_str)
                .collect();
            out.push_str(&format!(
                "| {} | {} | {:.1} | {} | {} |\n",
                result.repository,
                result.division,
                result.normalized_score,
                if result.requires_isolation { "yes" } else { "no" },
                findings.join("; "),
            ));
        }
    }

    out.push('\n');
    out
}

/// Format a check result as Markdown. Returns (markdown, passed).
pub fn format_check(report: &OrganizationCostReport, max_isolation: usize) -> (String, bool) {
    let candidates = report.isolation_candidate_count();
    let passed = candidates <= max_isolation;

    let mut out = format_report(report);

    if passed {
        out.push_str("## Result\n\n**CHECK PASSED**\n");
    } else {
        out.push_str(&format!(
            "## Result\n\n**CHECK FAILED**: {candidates} isolation candidate(s), at most {max_isolation} allowed\n",
        ));
    }

    (out, passed)
}
