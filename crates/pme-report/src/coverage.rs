//! Coverage score
//!
//! Ratio of expected operations that have a scenario somewhere in the suite,
//! per group and overall, with a letter grade.

use pme_engine::{CoverageReport, GroupResult};
use serde::{Deserialize, Serialize};

/// Coverage of one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCoverage {
    /// Group name
    pub name: String,
    /// Expected operations covered
    pub covered: usize,
    /// Expected operations
    pub expected: usize,
    /// Percentage covered (0-100)
    pub percentage: f64,
}

/// Coverage of a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageScore {
    /// Target type
    pub target_type: String,
    /// Per-group coverage in execution order
    pub groups: Vec<GroupCoverage>,
    /// Expected operations covered across groups
    pub covered: usize,
    /// Expected operations across groups
    pub expected: usize,
    /// Percentage covered (0-100)
    pub percentage: f64,
    /// Letter grade (A+ .. F)
    pub grade: String,
}

impl CoverageScore {
    /// Every expected operation is covered
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.covered == self.expected
    }
}

/// Percentage of `covered` over `expected`; nothing expected is full coverage
fn percentage(covered: usize, expected: usize) -> f64 {
    if expected == 0 {
        return 100.0;
    }
    (covered as f64 / expected as f64) * 100.0
}

fn group_coverage(group: &GroupResult) -> GroupCoverage {
    let covered = group.covered();
    GroupCoverage {
        name: group.name.clone(),
        covered,
        expected: group.expected,
        percentage: percentage(covered, group.expected),
    }
}

/// Score the coverage of `report`
#[must_use]
pub fn calculate(report: &CoverageReport) -> CoverageScore {
    let groups: Vec<GroupCoverage> = report.groups.iter().map(group_coverage).collect();
    let covered = groups.iter().map(|g| g.covered).sum();
    let expected = groups.iter().map(|g| g.expected).sum();
    let pct = percentage(covered, expected);
    CoverageScore {
        target_type: report.target_type.to_string(),
        groups,
        covered,
        expected,
        percentage: pct,
        grade: grade(pct),
    }
}

/// Letter grade for a coverage percentage
#[must_use]
pub fn grade(score: f64) -> String {
    const GRADE_TABLE: &[(f64, &str)] = &[
        (97.0, "A+"),
        (93.0, "A"),
        (90.0, "A-"),
        (87.0, "B+"),
        (83.0, "B"),
        (80.0, "B-"),
        (77.0, "C+"),
        (73.0, "C"),
        (70.0, "C-"),
        (67.0, "D+"),
        (63.0, "D"),
        (60.0, "D-"),
    ];
    GRADE_TABLE
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map_or_else(|| "F".to_string(), |(_, grade)| (*grade).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_report;

    #[test]
    fn test_grade_table() {
        assert_eq!(grade(100.0), "A+");
        assert_eq!(grade(93.0), "A");
        assert_eq!(grade(83.5), "B");
        assert_eq!(grade(59.9), "F");
    }

    #[test]
    fn test_empty_group_is_fully_covered() {
        assert!((percentage(0, 0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_calculate_from_report() {
        let score = calculate(&sample_report());
        assert_eq!(score.groups.len(), 2);
        assert_eq!(score.expected, 3);
        assert_eq!(score.covered, 2);
        assert!((score.percentage - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(score.grade, "D");
        assert!(!score.is_complete());

        let widget = &score.groups[0];
        assert_eq!(widget.name, "XWidget");
        assert_eq!((widget.covered, widget.expected), (1, 2));
    }
}
