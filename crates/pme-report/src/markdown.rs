//! Markdown summary
//!
//! Headers per group so the report chunks cleanly; missing and extra
//! scenarios are always listed by fully-qualified name, even when the run
//! ignored missing operations.

use pme_engine::{CoverageReport, GroupResult, Outcome};

use crate::coverage::CoverageScore;

/// Generate the Markdown summary of `report`
#[must_use]
pub fn generate_markdown(report: &CoverageReport, coverage: &CoverageScore) -> String {
    let mut md = String::with_capacity(4096);

    md.push_str(&format!(
        "# Conformance: {} (suite {})\n\n",
        report.target_type, report.suite_type
    ));

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- **Status**: {}\n", status(report)));
    md.push_str(&format!(
        "- **Scenarios**: {} passed / {} failed / {} total ({:.1}%)\n",
        report.passed(),
        report.failed(),
        report.total(),
        report.pass_rate()
    ));
    md.push_str(&format!(
        "- **Excluded**: {} (credited as passes)\n",
        report.excluded()
    ));
    md.push_str(&format!("- **Tolerated**: {}\n", report.tolerated()));
    md.push_str(&format!(
        "- **Missing**: {}{}\n",
        report.missing_count(),
        if report.policies.counts_missing() {
            ""
        } else {
            " (not counted)"
        }
    ));
    md.push_str(&format!("- **Extra**: {}\n", report.extra_count()));
    md.push_str(&format!(
        "- **Coverage**: {}/{} ({:.1}%, {})\n",
        coverage.covered, coverage.expected, coverage.percentage, coverage.grade
    ));
    md.push_str(&format!("- **Seed**: {}\n", report.seed));
    md.push_str(&format!(
        "- **Finished**: {} ({} ms)\n\n",
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC"),
        (report.finished_at - report.started_at).num_milliseconds()
    ));

    md.push_str("## Groups\n\n");
    md.push_str("| Group | Target | Total | Passed | Failed | Excluded | Tolerated | Missing | Extra |\n");
    md.push_str("|-------|--------|-------|--------|--------|----------|-----------|---------|-------|\n");
    for g in &report.groups {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
            g.name,
            g.target_type.as_ref().map_or("-", |t| t.as_str()),
            g.total,
            g.passed,
            g.failed,
            g.excluded,
            g.tolerated,
            g.missing.len(),
            g.extra.len()
        ));
    }
    md.push('\n');

    for g in &report.groups {
        group_section(&mut md, g);
    }

    if !report.groups_not_run.is_empty() {
        md.push_str("## Groups Not Run\n\n");
        for name in &report.groups_not_run {
            md.push_str(&format!("- {name}\n"));
        }
        md.push('\n');
    }

    md.push_str("## Reproduction\n\n");
    md.push_str("```bash\n");
    md.push_str(&format!(
        "pme autotest --target {} --suite {} --seed {}\n",
        report.target_type, report.suite_type, report.seed
    ));
    md.push_str("```\n");

    md
}

fn status(report: &CoverageReport) -> &'static str {
    if report.stopped_early() {
        "STOPPED"
    } else if report.is_pass() {
        "PASS"
    } else {
        "FAIL"
    }
}

fn group_section(md: &mut String, g: &GroupResult) {
    let failures: Vec<_> = g.outcomes.iter().filter(|o| o.outcome.is_fail()).collect();
    let tolerated: Vec<_> = g
        .outcomes
        .iter()
        .filter(|o| o.outcome == Outcome::Tolerated)
        .collect();
    if g.missing.is_empty() && g.extra.is_empty() && failures.is_empty() && tolerated.is_empty() {
        return;
    }

    md.push_str(&format!("### {}\n\n", g.name));
    if !g.missing.is_empty() {
        md.push_str("**Missing**\n\n");
        for name in &g.missing {
            md.push_str(&format!("- `{name}`\n"));
        }
        md.push('\n');
    }
    if !g.extra.is_empty() {
        md.push_str("**Extra**\n\n");
        for name in &g.extra {
            md.push_str(&format!("- `{name}`\n"));
        }
        md.push('\n');
    }
    if !failures.is_empty() {
        md.push_str("**Failures**\n\n");
        for o in failures {
            md.push_str(&format!(
                "- `{}` {}: {}\n",
                o.scenario,
                o.outcome,
                o.reason().unwrap_or("no message")
            ));
        }
        md.push('\n');
    }
    if !tolerated.is_empty() {
        md.push_str("**Tolerated**\n\n");
        for o in tolerated {
            md.push_str(&format!("- `{}`: {}\n", o.scenario, o.reason().unwrap_or("")));
        }
        md.push('\n');
    }
}
