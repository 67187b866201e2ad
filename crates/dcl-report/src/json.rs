use serde::Serialize;

use dcl_core::aggregate::OrganizationCostReport;

/// Format a full organization report as JSON.
pub fn format_report(report: &OrganizationCostReport, compact: bool) -> String {
    if compact {
        serde_json::to_string(report).expect("OrganizationCostReport should be serializable")
    } else {
        serde_json::to_string_pretty(report).expect("OrganizationCostReport should be serializable")
    }
}

/// Wrapper for check output that adds pass/fail metadata.
#[derive(Debug, Serialize)]
pub struct CheckOutput<'a> {
    #[serde(flatten)]
    pub report: &'a OrganizationCostReport,
    pub check: CheckStatus,
}

#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub passed: bool,
    pub max_isolation: usize,
    pub isolation_candidate_count: usize,
}

/// Format a check result as JSON. Returns (json_string, passed).
pub fn format_check(
    report: &OrganizationCostReport,
    max_isolation: usize,
    compact: bool,
) -> (String, bool) {
    let candidates = report.isolation_candidate_count();
    let passed = candidates <= max_isolation;

    let output = CheckOutput {
        report,
        check: CheckStatus {
            passed,
            max_isolation,
            isolation_candidate_count: candidates,
        },
    };

    let json = if compact {
        serde_json::to_string(&output).expect("CheckOutput should be serializable")
    } else {
        serde_json::to_string_pretty(&output).expect("CheckOutput should be serializable")
    };

    (json, passed)
}
