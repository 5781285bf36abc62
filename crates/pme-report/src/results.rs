//! Pass/fail tally file
//!
//! One `PASSED` line per counted pass and one `FAILED` line per counted
//! failure, for drivers that only count lines.

use pme_engine::CoverageReport;

/// File name used by [`crate::write_reports`]
pub const RESULTS_FILENAME: &str = "results.txt";

/// Render the tally for `report`
#[must_use]
pub fn generate_results(report: &CoverageReport) -> String {
    let mut out = String::with_capacity((report.passed() + report.failed()) * 7);
    for _ in 0..report.passed() {
        out.push_str("PASSED\n");
    }
    for _ in 0..report.failed() {
        out.push_str("FAILED\n");
    }
    out
}
