//! Scenario grouping
//!
//! Walks the test-suite ancestor chain and the target ancestor chain in
//! lockstep. Each suite level is paired with the target level at the same
//! depth; suite levels beyond the end of the target chain pair with nothing
//! and all their scenarios are extra.

use crate::error::Result;
use crate::matcher;
use crate::policy::ExclusionSet;
use pme_meta::{
    OperationDescriptor, OperationKind, ScenarioDescriptor, TypeMetadata, TypeRef, Visibility,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One step of the lockstep ancestor walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyLevel {
    /// Test-suite type at this depth
    pub suite_type: TypeRef,
    /// Target type at the same depth, `None` once the target chain is exhausted
    pub target_type: Option<TypeRef>,
}

/// Pair the suite's ancestry with the target's, most-derived first
#[must_use]
pub fn pair_levels(meta: &dyn TypeMetadata, target: &TypeRef, suite: &TypeRef) -> Vec<HierarchyLevel> {
    let targets = meta.ancestry(target);
    meta.ancestry(suite)
        .into_iter()
        .enumerate()
        .map(|(depth, suite_type)| HierarchyLevel {
            suite_type,
            target_type: targets.get(depth).cloned(),
        })
        .collect()
}

/// Whether `op` is expected to have a scenario at all
#[must_use]
pub fn is_expected_operation(op: &OperationDescriptor, exclusions: &ExclusionSet) -> bool {
    if op.is_static || op.visibility != Visibility::Public || op.is_plumbing() {
        return false;
    }
    match op.kind {
        OperationKind::Method => true,
        OperationKind::Property => !exclusions.is_property_excluded(op.member_name()),
        OperationKind::Event => !exclusions.is_event_excluded(op.member_name()),
    }
}

/// Expected operations and scenarios for one level of the walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioGroup {
    /// Short name of the suite type
    pub name: String,
    /// Suite type whose scenarios make up the group
    pub suite_type: TypeRef,
    /// Paired target level
    pub target_type: Option<TypeRef>,
    /// Operations introduced by the paired target level
    pub expected_operations: Vec<OperationDescriptor>,
    /// Scenarios declared by the suite level, in discovery order
    pub implemented_scenarios: Vec<ScenarioDescriptor>,
    /// Expected operations no scenario anywhere covers
    pub missing: Vec<OperationDescriptor>,
    /// Scenarios that cover none of this level's expected operations
    pub extra: Vec<ScenarioDescriptor>,
}

impl ScenarioGroup {
    /// Build a group, deriving `missing` against every scenario of the run and
    /// `extra` against this level's own expectations
    #[must_use]
    pub fn new(
        level: &HierarchyLevel,
        expected_operations: Vec<OperationDescriptor>,
        implemented_scenarios: Vec<ScenarioDescriptor>,
        all_scenarios: &[ScenarioDescriptor],
    ) -> Self {
        let missing = expected_operations
            .iter()
            .filter(|op| !matcher::is_covered(op, all_scenarios))
            .cloned()
            .collect();
        let extra = implemented_scenarios
            .iter()
            .filter(|s| !matcher::covers_any(s, &expected_operations))
            .cloned()
            .collect();
        Self {
            name: level.suite_type.short_name().to_string(),
            suite_type: level.suite_type.clone(),
            target_type: level.target_type.clone(),
            expected_operations,
            implemented_scenarios,
            missing,
            extra,
        }
    }

    /// Drop `op` from the missing set; true if it was there
    pub fn apply_override(&mut self, op: &OperationDescriptor) -> bool {
        let before = self.missing.len();
        self.missing
            .retain(|m| !(m.same_member(op) && m.declaring_type == op.declaring_type));
        self.missing.len() != before
    }

    /// Fully-qualified names of the missing operations
    #[must_use]
    pub fn missing_names(&self) -> Vec<String> {
        self.missing.iter().map(OperationDescriptor::qualified_name).collect()
    }

    /// Fully-qualified names of the extra scenarios
    #[must_use]
    pub fn extra_names(&self) -> Vec<String> {
        self.extra.iter().map(ScenarioDescriptor::qualified_name).collect()
    }
}

/// Builds scenario groups from metadata
pub struct GroupingEngine<'a> {
    meta: &'a dyn TypeMetadata,
    exclusions: ExclusionSet,
}

impl<'a> GroupingEngine<'a> {
    /// Engine with no exclusions
    #[must_use]
    pub fn new(meta: &'a dyn TypeMetadata) -> Self {
        Self {
            meta,
            exclusions: ExclusionSet::default(),
        }
    }

    /// Drop excluded properties and events from the expected operations
    #[must_use]
    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Expected operations of `target`, bucketed by declaring type
    ///
    /// # Errors
    ///
    /// Returns an error if `target` is unknown.
    pub fn expected_by_declaring_type(
        &self,
        target: &TypeRef,
    ) -> Result<BTreeMap<TypeRef, Vec<OperationDescriptor>>> {
        let mut buckets: BTreeMap<TypeRef, Vec<OperationDescriptor>> = BTreeMap::new();
        for op in self.meta.list_public_operations(target)? {
            if is_expected_operation(&op, &self.exclusions) {
                buckets.entry(op.declaring_type.clone()).or_default().push(op);
            } else {
                debug!(operation = %op.qualified_name(), "operation not expected");
            }
        }
        Ok(buckets)
    }

    /// Build one group per suite level that declares scenarios or whose paired
    /// target level introduces expected operations, most-derived first
    ///
    /// # Errors
    ///
    /// Returns an error if `target` is unknown.
    pub fn build_groups(
        &self,
        target: &TypeRef,
        suite: &TypeRef,
        scenarios: &[ScenarioDescriptor],
    ) -> Result<Vec<ScenarioGroup>> {
        let levels = pair_levels(self.meta, target, suite);
        let mut expected = self.expected_by_declaring_type(target)?;

        let mut implemented: BTreeMap<&TypeRef, Vec<ScenarioDescriptor>> = BTreeMap::new();
        for scenario in scenarios {
            if levels.iter().any(|l| l.suite_type == scenario.declaring_type) {
                implemented
                    .entry(&scenario.declaring_type)
                    .or_default()
                    .push(scenario.clone());
            } else {
                warn!(
                    scenario = %scenario.qualified_name(),
                    suite = %suite,
                    "scenario declared outside the suite hierarchy"
                );
            }
        }

        let mut groups = Vec::new();
        for level in &levels {
            let level_expected = level
                .target_type
                .as_ref()
                .and_then(|t| expected.remove(t))
                .unwrap_or_default();
            let level_scenarios = implemented.remove(&level.suite_type).unwrap_or_default();
            if level_expected.is_empty() && level_scenarios.is_empty() {
                continue;
            }
            let group = ScenarioGroup::new(level, level_expected, level_scenarios, scenarios);
            debug!(
                group = %group.name,
                expected = group.expected_operations.len(),
                scenarios = group.implemented_scenarios.len(),
                missing = group.missing.len(),
                extra = group.extra.len(),
                "built scenario group"
            );
            groups.push(group);
        }
        Ok(groups)
    }
}
