//! Hand-built coverage report shared by the report tests

use chrono::Utc;
use pme_engine::{CoverageReport, GroupResult, Outcome, RunPolicies, ScenarioOutcome};
use pme_meta::TypeRef;

fn outcome(scenario: &str, group: &str, outcome: Outcome) -> ScenarioOutcome {
    ScenarioOutcome::new(scenario, group, outcome).with_duration_ms(12)
}

/// Two groups:
///
/// - `XWidget`: `Name()` passed, `Layout()` failed, `Draw()` excluded,
///   `Widget.Enabled()` missing and counted, `XWidget.Layout()` extra
/// - `XBase`: generated `Id()` passed, generated `Disposed()` tolerated
pub fn sample_report() -> CoverageReport {
    let mut failed = outcome("Layout()", "XWidget", Outcome::Failed);
    failed.failures.push("layout rejected <width> & height".to_string());
    let widget = GroupResult {
        name: "XWidget".to_string(),
        suite_type: TypeRef::new("XWidget"),
        target_type: Some(TypeRef::new("Widget")),
        total: 4,
        passed: 2,
        failed: 2,
        excluded: 1,
        tolerated: 0,
        expected: 2,
        counted_missing: 1,
        missing: vec!["Widget.Enabled()".to_string()],
        extra: vec!["XWidget.Layout()".to_string()],
        outcomes: vec![
            outcome("Name()", "XWidget", Outcome::Passed),
            failed,
            ScenarioOutcome::excluded("Draw()", "XWidget", "not eligible in pre-handle mode"),
        ],
        continue_run: true,
    };

    let mut tolerated = outcome("Disposed()", "XBase", Outcome::Tolerated).generated(true);
    tolerated.notes.push("Disposed: permission denied".to_string());
    let base = GroupResult {
        name: "XBase".to_string(),
        suite_type: TypeRef::new("XBase"),
        target_type: Some(TypeRef::new("Base")),
        total: 1,
        passed: 1,
        failed: 0,
        excluded: 0,
        tolerated: 1,
        expected: 1,
        counted_missing: 0,
        missing: Vec::new(),
        extra: Vec::new(),
        outcomes: vec![outcome("Id()", "XBase", Outcome::Passed).generated(true), tolerated],
        continue_run: true,
    };

    let mut report = CoverageReport::new(
        TypeRef::new("Widget"),
        TypeRef::new("XWidget"),
        7,
        RunPolicies::default().with_seed(7),
    );
    report.groups = vec![widget, base];
    report.finished_at = Utc::now();
    report
}
