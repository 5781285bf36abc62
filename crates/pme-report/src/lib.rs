//! PME Report Generator
//!
//! Renders a [`CoverageReport`] as Markdown, JUnit XML, JSON and a
//! `results.txt` pass/fail tally, and scores coverage with a letter grade.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// Allow common patterns
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::format_push_string)]
#![allow(clippy::needless_raw_string_hashes)]
#![allow(clippy::uninlined_format_args)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::redundant_clone))]
#![cfg_attr(test, allow(clippy::float_cmp))]

pub mod coverage;
pub mod error;
pub mod junit;
pub mod markdown;
pub mod results;

#[cfg(test)]
mod test_support;

pub use coverage::{CoverageScore, GroupCoverage};
pub use error::{Error, Result};
pub use junit::JunitReport;
pub use markdown::generate_markdown;
pub use results::{RESULTS_FILENAME, generate_results};

use pme_engine::CoverageReport;
use std::path::{Path, PathBuf};

/// Paths written by [`write_reports`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    /// Markdown summary
    pub markdown: PathBuf,
    /// JUnit XML
    pub junit: PathBuf,
    /// JSON export of the report
    pub json: PathBuf,
    /// Pass/fail tally
    pub results: PathBuf,
}

/// Write every report format for `report` into `dir`, creating it if needed
///
/// # Errors
///
/// Returns an error if `dir` is an existing file or any write fails.
pub fn write_reports(report: &CoverageReport, dir: &Path) -> Result<ReportFiles> {
    if dir.is_file() {
        return Err(Error::InvalidOutput {
            path: dir.display().to_string(),
            reason: "not a directory".to_string(),
        });
    }
    std::fs::create_dir_all(dir)?;

    let score = coverage::calculate(report);
    let files = ReportFiles {
        markdown: dir.join("report.md"),
        junit: dir.join("junit.xml"),
        json: dir.join("report.json"),
        results: dir.join(RESULTS_FILENAME),
    };
    std::fs::write(&files.markdown, generate_markdown(report, &score))?;
    std::fs::write(&files.junit, JunitReport::default().generate(report)?)?;
    std::fs::write(&files.json, report.to_json()?)?;
    std::fs::write(&files.results, generate_results(report))?;
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_report;
    use tempfile::TempDir;

    #[test]
    fn test_write_reports() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("reports");
        let files = write_reports(&sample_report(), &out).unwrap();

        let json = std::fs::read_to_string(&files.json).unwrap();
        let back: CoverageReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seed, 7);
        assert_eq!(back.groups.len(), 2);

        assert!(std::fs::read_to_string(&files.junit).unwrap().contains("<testsuites"));
        assert!(std::fs::read_to_string(&files.markdown).unwrap().contains("## Summary"));
        assert_eq!(std::fs::read_to_string(&files.results).unwrap().lines().count(), 5);
    }

    #[test]
    fn test_write_reports_rejects_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = write_reports(&sample_report(), file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidOutput { .. }));
    }
}
