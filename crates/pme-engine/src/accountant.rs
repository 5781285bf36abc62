//! Coverage accounting
//!
//! Closes each group once its scenarios have run, folding missing operations
//! and pre-execution exclusions into the group's counts, and aggregates the
//! group results into a [`CoverageReport`].

use crate::evidence::{Outcome, ScenarioOutcome};
use crate::grouping::ScenarioGroup;
use crate::policy::RunPolicies;
use chrono::{DateTime, Utc};
use pme_meta::TypeRef;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Counts and listings for one closed group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupResult {
    /// Group name
    pub name: String,
    /// Suite level
    pub suite_type: TypeRef,
    /// Paired target level
    pub target_type: Option<TypeRef>,
    /// Counted scenarios, including counted missing operations and credited exclusions
    pub total: usize,
    /// Passes, including credited exclusions
    pub passed: usize,
    /// Failures, including counted missing operations
    pub failed: usize,
    /// Scenarios excluded before execution
    pub excluded: usize,
    /// Scenarios that hit a tolerated permission denial
    pub tolerated: usize,
    /// Operations the paired target level introduces
    pub expected: usize,
    /// Missing operations that were counted as failures
    pub counted_missing: usize,
    /// Fully-qualified names of every missing operation, counted or not
    pub missing: Vec<String>,
    /// Fully-qualified names of extra scenarios
    pub extra: Vec<String>,
    /// Per-scenario outcomes in execution order
    pub outcomes: Vec<ScenarioOutcome>,
    /// Whether the run proceeds to the next group
    pub continue_run: bool,
}

impl GroupResult {
    /// No failures counted
    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.failed == 0
    }

    /// Scenarios that actually executed
    #[must_use]
    pub fn executed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_executed()).count()
    }

    /// Expected operations with a scenario somewhere in the suite
    #[must_use]
    pub fn covered(&self) -> usize {
        self.expected.saturating_sub(self.missing.len())
    }
}

/// Applies the missing-operation and exclusion policies at group close
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageAccountant {
    ignore_missing: bool,
    auto_test_only: bool,
    stop_on_group_failure: bool,
}

impl CoverageAccountant {
    /// Accountant for `policies`
    #[must_use]
    pub fn from_policies(policies: &RunPolicies) -> Self {
        Self {
            ignore_missing: policies.ignore_missing,
            auto_test_only: policies.auto_test_only,
            stop_on_group_failure: policies.stop_on_group_failure,
        }
    }

    /// Close `group` after `executed_total` scenarios ran with
    /// `executed_failures` failures and `excluded` were excluded up front.
    ///
    /// Each counted missing operation adds one failure and one total. Each
    /// exclusion adds one pass and one total, so filtered and unfiltered runs
    /// report the same totals.
    #[must_use]
    pub fn close_group(
        &self,
        group: &ScenarioGroup,
        executed_total: usize,
        executed_failures: usize,
        excluded: usize,
    ) -> GroupResult {
        let counted_missing = if self.ignore_missing || self.auto_test_only {
            0
        } else {
            group.missing.len()
        };
        let failed = executed_failures + counted_missing;
        let total = executed_total + counted_missing + excluded;
        let passed = total.saturating_sub(failed);
        let continue_run = !(self.stop_on_group_failure && failed > 0);

        if excluded > 0 {
            info!(group = %group.name, excluded, "credited excluded scenarios as passes");
        }

        GroupResult {
            name: group.name.clone(),
            suite_type: group.suite_type.clone(),
            target_type: group.target_type.clone(),
            total,
            passed,
            failed,
            excluded,
            tolerated: 0,
            expected: group.expected_operations.len(),
            counted_missing,
            missing: group.missing_names(),
            extra: group.extra_names(),
            outcomes: Vec::new(),
            continue_run,
        }
    }

    /// Close `group` from its recorded outcomes
    #[must_use]
    pub fn close_with_outcomes(&self, group: &ScenarioGroup, outcomes: Vec<ScenarioOutcome>) -> GroupResult {
        let executed_total = outcomes.iter().filter(|o| o.outcome.is_executed()).count();
        let executed_failures = outcomes.iter().filter(|o| o.outcome.is_fail()).count();
        let excluded = outcomes
            .iter()
            .filter(|o| o.outcome == Outcome::Excluded)
            .count();
        let tolerated = outcomes
            .iter()
            .filter(|o| o.outcome == Outcome::Tolerated)
            .count();

        let mut result = self.close_group(group, executed_total, executed_failures, excluded);
        result.tolerated = tolerated;
        result.outcomes = outcomes;
        result
    }
}

/// Aggregated results of one conformance run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Target type
    pub target_type: TypeRef,
    /// Test-suite type
    pub suite_type: TypeRef,
    /// Seed every random probe value was drawn from
    pub seed: u64,
    /// Policies in force
    pub policies: RunPolicies,
    /// Closed groups in execution order
    pub groups: Vec<GroupResult>,
    /// Groups skipped because the run stopped early
    pub groups_not_run: Vec<String>,
    /// Run start
    pub started_at: DateTime<Utc>,
    /// Run end
    pub finished_at: DateTime<Utc>,
}

impl CoverageReport {
    /// Empty report starting now
    #[must_use]
    pub fn new(target_type: TypeRef, suite_type: TypeRef, seed: u64, policies: RunPolicies) -> Self {
        let now = Utc::now();
        Self {
            target_type,
            suite_type,
            seed,
            policies,
            groups: Vec::new(),
            groups_not_run: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    /// Total counted scenarios
    #[must_use]
    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.total).sum()
    }

    /// Total passes
    #[must_use]
    pub fn passed(&self) -> usize {
        self.groups.iter().map(|g| g.passed).sum()
    }

    /// Total failures
    #[must_use]
    pub fn failed(&self) -> usize {
        self.groups.iter().map(|g| g.failed).sum()
    }

    /// Total exclusions
    #[must_use]
    pub fn excluded(&self) -> usize {
        self.groups.iter().map(|g| g.excluded).sum()
    }

    /// Total tolerated denials
    #[must_use]
    pub fn tolerated(&self) -> usize {
        self.groups.iter().map(|g| g.tolerated).sum()
    }

    /// Missing operations across groups, counted or not
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.groups.iter().map(|g| g.missing.len()).sum()
    }

    /// Extra scenarios across groups
    #[must_use]
    pub fn extra_count(&self) -> usize {
        self.groups.iter().map(|g| g.extra.len()).sum()
    }

    /// Whether the run stopped before every group ran
    #[must_use]
    pub fn stopped_early(&self) -> bool {
        !self.groups_not_run.is_empty()
    }

    /// No failures and every group ran
    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.failed() == 0 && !self.stopped_early()
    }

    /// Pass rate as a percentage
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pass_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.passed() as f64 / total as f64) * 100.0
    }

    /// Every scenario outcome in execution order
    pub fn outcomes(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.groups.iter().flat_map(|g| g.outcomes.iter())
    }

    /// Look up a group by name
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&GroupResult> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Export to JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
