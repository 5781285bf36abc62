//! JUnit XML Report Generator
//!
//! One `<testsuite>` per scenario group. Executed, excluded and tolerated
//! scenarios each become a `<testcase>`; every counted missing operation
//! becomes a failing `<testcase>` of its own.

use pme_engine::{CoverageReport, GroupResult, Outcome, ScenarioOutcome};
use std::io::Write;

use crate::error::Result;

/// JUnit XML report generator
#[derive(Debug)]
pub struct JunitReport {
    /// Name of the `<testsuites>` root
    name: String,
}

impl JunitReport {
    /// Create a new JUnit report generator
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Generate JUnit XML for `report`
    ///
    /// # Errors
    ///
    /// Returns an error if XML generation fails.
    pub fn generate(&self, report: &CoverageReport) -> Result<String> {
        let mut output = Vec::new();
        self.write_xml(&mut output, report)?;
        Ok(String::from_utf8_lossy(&output).to_string())
    }

    fn write_xml<W: Write>(&self, writer: &mut W, report: &CoverageReport) -> Result<()> {
        let tests: usize = report.groups.iter().map(tests_in).sum();
        let failures: usize = report.groups.iter().map(failures_in).sum();
        let errors: usize = report.groups.iter().map(errors_in).sum();
        let skipped: usize = report.groups.iter().map(skipped_in).sum();

        writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            writer,
            r#"<testsuites name="{}" tests="{}" failures="{}" errors="{}" skipped="{}">"#,
            escape_xml(&self.name),
            tests,
            failures,
            errors,
            skipped
        )?;
        for group in &report.groups {
            Self::write_suite(writer, report, group)?;
        }
        writeln!(writer, "</testsuites>")?;
        Ok(())
    }

    fn write_suite<W: Write>(writer: &mut W, report: &CoverageReport, group: &GroupResult) -> Result<()> {
        let time: f64 = group
            .outcomes
            .iter()
            .map(|o| o.duration_ms as f64 / 1000.0)
            .sum();
        writeln!(
            writer,
            r#"  <testsuite name="{}" tests="{}" failures="{}" errors="{}" skipped="{}" time="{:.3}">"#,
            escape_xml(&group.name),
            tests_in(group),
            failures_in(group),
            errors_in(group),
            skipped_in(group),
            time
        )?;

        writeln!(writer, "    <properties>")?;
        writeln!(
            writer,
            r#"      <property name="pme.target" value="{}"/>"#,
            escape_xml(group.target_type.as_ref().map_or("", |t| t.as_str()))
        )?;
        writeln!(writer, r#"      <property name="pme.seed" value="{}"/>"#, report.seed)?;
        writeln!(
            writer,
            r#"      <property name="pme.extra" value="{}"/>"#,
            group.extra.len()
        )?;
        writeln!(writer, "    </properties>")?;

        for outcome in &group.outcomes {
            Self::write_testcase(writer, group, outcome)?;
        }
        for name in group.missing.iter().take(group.counted_missing) {
            writeln!(
                writer,
                r#"    <testcase classname="{}" name="missing: {}" time="0.000">"#,
                escape_xml(&group.name),
                escape_xml(name)
            )?;
            writeln!(
                writer,
                r#"      <failure message="No scenario covers {}" type="MissingScenario"/>"#,
                escape_xml(name)
            )?;
            writeln!(writer, "    </testcase>")?;
        }

        writeln!(writer, "  </testsuite>")?;
        Ok(())
    }

    fn write_testcase<W: Write>(writer: &mut W, group: &GroupResult, outcome: &ScenarioOutcome) -> Result<()> {
        let time = outcome.duration_ms as f64 / 1000.0;
        writeln!(
            writer,
            r#"    <testcase classname="{}" name="{}" time="{:.3}">"#,
            escape_xml(&group.name),
            escape_xml(&outcome.scenario),
            time
        )?;

        let reason = outcome.reason().unwrap_or("");
        match outcome.outcome {
            Outcome::Passed => {}
            Outcome::Failed => {
                writeln!(
                    writer,
                    r#"      <failure message="{}" type="AssertionError">"#,
                    escape_xml(reason)
                )?;
                for failure in &outcome.failures {
                    writeln!(writer, "{}", escape_xml(failure))?;
                }
                writeln!(writer, "      </failure>")?;
            }
            Outcome::Fatal => {
                writeln!(
                    writer,
                    r#"      <error message="{}" type="FatalScenarioError"/>"#,
                    escape_xml(reason)
                )?;
            }
            Outcome::Excluded => {
                writeln!(
                    writer,
                    r#"      <skipped message="excluded: {}"/>"#,
                    escape_xml(reason)
                )?;
            }
            Outcome::Tolerated => {
                writeln!(
                    writer,
                    r#"      <skipped message="tolerated: {}"/>"#,
                    escape_xml(reason)
                )?;
            }
        }

        writeln!(writer, "    </testcase>")?;
        Ok(())
    }
}

impl Default for JunitReport {
    fn default() -> Self {
        Self::new("pme-conformance")
    }
}

fn tests_in(group: &GroupResult) -> usize {
    group.outcomes.len() + group.counted_missing
}

fn failures_in(group: &GroupResult) -> usize {
    group
        .outcomes
        .iter()
        .filter(|o| o.outcome == Outcome::Failed)
        .count()
        + group.counted_missing
}

fn errors_in(group: &GroupResult) -> usize {
    group
        .outcomes
        .iter()
        .filter(|o| o.outcome == Outcome::Fatal)
        .count()
}

fn skipped_in(group: &GroupResult) -> usize {
    group
        .outcomes
        .iter()
        .filter(|o| matches!(o.outcome, Outcome::Excluded | Outcome::Tolerated))
        .count()
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_report;

    #[test]
    fn test_root_counts() {
        let xml = JunitReport::default().generate(&sample_report()).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(
            r#"<testsuites name="pme-conformance" tests="6" failures="2" errors="0" skipped="2">"#
        ));
        assert!(xml.trim_end().ends_with("</testsuites>"));
    }

    #[test]
    fn test_one_suite_per_group() {
        let xml = JunitReport::new("run").generate(&sample_report()).unwrap();
        assert_eq!(xml.matches("<testsuite ").count(), 2);
        assert!(xml.contains(r#"<testsuite name="XWidget" tests="4" failures="2" errors="0" skipped="1""#));
        assert!(xml.contains(r#"<property name="pme.seed" value="7"/>"#));
    }

    #[test]
    fn test_missing_operation_testcase() {
        let xml = JunitReport::default().generate(&sample_report()).unwrap();
        assert!(xml.contains(r#"name="missing: Widget.Enabled()""#));
        assert!(xml.contains(r#"type="MissingScenario""#));
    }

    #[test]
    fn test_uncounted_missing_has_no_testcase() {
        let mut report = sample_report();
        report.groups[0].counted_missing = 0;
        let xml = JunitReport::default().generate(&report).unwrap();
        assert!(!xml.contains("missing: Widget.Enabled()"));
    }

    #[test]
    fn test_skipped_and_escaped() {
        let xml = JunitReport::default().generate(&sample_report()).unwrap();
        assert!(xml.contains(r#"<skipped message="excluded: not eligible in pre-handle mode"/>"#));
        assert!(xml.contains(r#"<skipped message="tolerated: Disposed: permission denied"/>"#));
        assert!(xml.contains("layout rejected &lt;width&gt; &amp; height"));
    }

    #[test]
    fn test_fatal_is_error() {
        let mut report = sample_report();
        report.groups[0].outcomes[1].outcome = Outcome::Fatal;
        let xml = JunitReport::default().generate(&report).unwrap();
        assert!(xml.contains(r#"type="FatalScenarioError""#));
        assert!(xml.contains(r#"errors="1""#));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&apos;&amp;&apos;&lt;/a&gt;");
    }
}
