//! PME CLI Library
//!
//! Library functions for the `pme` command-line tool.

#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

use pme_engine::{
    CoverageReport, ExclusionSet, GroupingEngine, RunPolicies, ScenarioGroup, ScenarioRegistry,
    run_conformance_suite,
};
use pme_meta::{InMemoryTarget, ProbeFailure, ScenarioDescriptor, Target, TypeRef, TypeRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding extra command-line switches
pub const OPTIONS_ENV: &str = "PME_OPTIONS";

/// Append whitespace-separated switches from `extra` to `args`
pub fn args_with_env_options<I>(args: I, extra: Option<&str>) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut all: Vec<String> = args.into_iter().collect();
    if let Some(extra) = extra {
        all.extend(extra.split_whitespace().map(str::to_string));
    }
    all
}

/// Policy switches shared by the subcommands
#[derive(Debug, Clone, Default)]
pub struct PolicyOptions {
    /// Optional YAML policy file applied before the switches
    pub policy_file: Option<std::path::PathBuf>,
    /// Missing operations do not fail the run
    pub ignore_missing: bool,
    /// Stop after the first failing group
    pub stop_on_group_failure: bool,
    /// Stop after the first failing scenario
    pub stop_on_scenario_failure: bool,
    /// Pre-handle mode
    pub pre_handle: bool,
    /// Exclude ancestor-level scenarios
    pub no_base: bool,
    /// Skip out-of-range enumeration probes
    pub no_enum_bounds_test: bool,
    /// Tolerate events without a trigger
    pub tolerate_missing_trigger: bool,
    /// Qualified scenario names in outcomes
    pub full_names: bool,
    /// Fixed seed
    pub seed: Option<u64>,
    /// Excluded property names
    pub exclude_properties: Vec<String>,
    /// Excluded event names
    pub exclude_events: Vec<String>,
}

/// Build run policies from a policy file (if any) and the switches on top
pub fn build_policies(options: &PolicyOptions) -> Result<RunPolicies, String> {
    let mut policies = match &options.policy_file {
        Some(path) => RunPolicies::from_file(path).map_err(|e| format!("Error loading policies: {e}"))?,
        None => RunPolicies::default(),
    };
    policies.ignore_missing |= options.ignore_missing;
    policies.stop_on_group_failure |= options.stop_on_group_failure;
    policies.stop_on_scenario_failure |= options.stop_on_scenario_failure;
    policies.pre_handle_mode |= options.pre_handle;
    policies.exclude_ancestors |= options.no_base;
    policies.no_enum_bounds_test |= options.no_enum_bounds_test;
    policies.tolerate_missing_event_trigger |= options.tolerate_missing_trigger;
    policies.full_names |= options.full_names;
    if options.seed.is_some() {
        policies.seed = options.seed;
    }
    for name in &options.exclude_properties {
        policies.exclusions.excluded_properties.insert(name.clone());
    }
    for name in &options.exclude_events {
        policies.exclusions.excluded_events.insert(name.clone());
    }
    policies.validate().map_err(|e| e.to_string())?;
    Ok(policies)
}

/// Load a type registry manifest
pub fn load_registry(path: &Path) -> Result<TypeRegistry, String> {
    TypeRegistry::from_file(path).map_err(|e| format!("Error loading types: {e}"))
}

/// Scenario descriptors of a test suite, as listed in a YAML manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioManifest {
    /// Declared scenarios
    #[serde(default)]
    pub scenarios: Vec<ScenarioDescriptor>,
}

/// Load a scenario manifest
pub fn load_scenarios(path: &Path) -> Result<ScenarioManifest, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading scenarios {}: {e}", path.display()))?;
    serde_yaml::from_str(&content).map_err(|e| format!("Error parsing scenarios: {e}"))
}

/// Build groups without executing anything
pub fn audit(
    registry: &TypeRegistry,
    scenarios: &[ScenarioDescriptor],
    target: &TypeRef,
    suite: &TypeRef,
    exclusions: ExclusionSet,
) -> Result<Vec<ScenarioGroup>, String> {
    GroupingEngine::new(registry)
        .with_exclusions(exclusions)
        .build_groups(target, suite, scenarios)
        .map_err(|e| format!("Error building groups: {e}"))
}

/// Markdown rendering of an audit
pub fn audit_markdown(groups: &[ScenarioGroup], target: &TypeRef, suite: &TypeRef) -> String {
    let mut md = format!("# Coverage audit: {target} (suite {suite})\n\n");
    md.push_str("| Group | Target | Expected | Scenarios | Missing | Extra |\n");
    md.push_str("|-------|--------|----------|-----------|---------|-------|\n");
    for g in groups {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            g.name,
            g.target_type.as_ref().map_or("-", TypeRef::as_str),
            g.expected_operations.len(),
            g.implemented_scenarios.len(),
            g.missing.len(),
            g.extra.len()
        ));
    }
    for g in groups {
        if g.missing.is_empty() && g.extra.is_empty() {
            continue;
        }
        md.push_str(&format!("\n## {}\n", g.name));
        for name in g.missing_names() {
            md.push_str(&format!("- missing `{name}`\n"));
        }
        for name in g.extra_names() {
            md.push_str(&format!("- extra `{name}`\n"));
        }
    }
    md
}

/// JSON rendering of an audit
pub fn audit_json(groups: &[ScenarioGroup]) -> Result<String, String> {
    serde_json::to_string_pretty(groups).map_err(|e| format!("Error serializing audit: {e}"))
}

/// Run generated probes only against an in-memory realization of `target`
pub fn run_autotest(
    registry: &TypeRegistry,
    target: &TypeRef,
    suite: &TypeRef,
    mut policies: RunPolicies,
) -> Result<CoverageReport, String> {
    policies.auto_test = true;
    policies.auto_test_only = true;
    let mut factory = || -> Result<Box<dyn Target>, ProbeFailure> {
        InMemoryTarget::from_metadata(registry, target)
            .map(|t| Box::new(t) as Box<dyn Target>)
            .map_err(|e| ProbeFailure::Other(e.to_string()))
    };
    run_conformance_suite(
        registry,
        target,
        suite,
        &mut ScenarioRegistry::new(),
        &mut factory,
        policies,
    )
    .map_err(|e| format!("Error running auto-tests: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TYPES: &str = r"
enums:
  - name: Dock
    members: [{ name: None, value: 0 }, { name: Top, value: 2 }, { name: Fill, value: 5 }]
types:
  - name: Base
    properties:
      - { name: Id, type: { kind: int }, writable: false }
  - name: Widget
    ancestor: Base
    methods:
      - { name: Scale, parameters: [Int32, Int32] }
      - { name: OnClick, parameters: [EventArgs], visibility: protected }
    properties:
      - { name: Name, type: { kind: str } }
      - { name: Enabled, type: { kind: bool } }
      - { name: Dock, type: { kind: object, type_name: Dock } }
    events:
      - { name: Click }
  - name: XBase
  - name: XWidget
    ancestor: XBase
";

    const SCENARIOS: &str = r"
scenarios:
  - { name: Name, declaring_type: XWidget, kind: property }
  - { name: Id, declaring_type: XBase, kind: property }
  - { name: Legacy, declaring_type: XWidget }
";

    fn write(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_env_options_are_appended() {
        let args = vec!["pme".to_string(), "autotest".to_string()];
        let all = args_with_env_options(args.clone(), Some("  --no-base\t--seed 3 "));
        assert_eq!(all, vec!["pme", "autotest", "--no-base", "--seed", "3"]);
        assert_eq!(args_with_env_options(args.clone(), None), args);
    }

    #[test]
    fn test_build_policies_from_switches() {
        let options = PolicyOptions {
            ignore_missing: true,
            no_base: true,
            seed: Some(9),
            exclude_properties: vec!["Enabled".to_string()],
            ..PolicyOptions::default()
        };
        let p = build_policies(&options).unwrap();
        assert!(p.ignore_missing);
        assert!(p.exclude_ancestors);
        assert_eq!(p.seed, Some(9));
        assert!(p.exclusions.is_property_excluded("Enabled"));
    }

    #[test]
    fn test_build_policies_from_file() {
        let file = write("stop_on_group_failure: true\nexcluded_events: [Click]\n");
        let options = PolicyOptions {
            policy_file: Some(file.path().to_path_buf()),
            full_names: true,
            ..PolicyOptions::default()
        };
        let p = build_policies(&options).unwrap();
        assert!(p.stop_on_group_failure);
        assert!(p.full_names);
        assert!(p.exclusions.is_event_excluded("Click"));
    }

    #[test]
    fn test_audit_lists_missing_and_extra() {
        let types = write(TYPES);
        let scenarios = write(SCENARIOS);
        let registry = load_registry(types.path()).unwrap();
        let manifest = load_scenarios(scenarios.path()).unwrap();
        let groups = audit(
            &registry,
            &manifest.scenarios,
            &TypeRef::new("Widget"),
            &TypeRef::new("XWidget"),
            ExclusionSet::default(),
        )
        .unwrap();
        assert_eq!(groups.len(), 2);
        let md = audit_markdown(&groups, &TypeRef::new("Widget"), &TypeRef::new("XWidget"));
        assert!(md.contains("- missing `Widget.Enabled()`"));
        assert!(md.contains("- missing `Widget.Scale(Int32, Int32)`"));
        assert!(md.contains("- extra `XWidget.Legacy()`"));
        let json = audit_json(&groups).unwrap();
        assert!(json.contains("\"name\": \"XWidget\""));
    }

    #[test]
    fn test_autotest_runs_generated_probes() {
        let registry = load_registry(write(TYPES).path()).unwrap();
        let policies = RunPolicies::default().with_seed(1);
        let report = run_autotest(
            &registry,
            &TypeRef::new("Widget"),
            &TypeRef::new("XWidget"),
            policies,
        )
        .unwrap();
        assert!(report.is_pass(), "{}", report.to_json().unwrap());
        assert!(report.policies.auto_test_only);
        // Name, Enabled, Dock and Click
        assert_eq!(report.total(), 4);
    }

    #[test]
    fn test_bad_manifest_is_reported() {
        let err = load_registry(write("types: [{ name: A, ancestor: Missing }]").path()).unwrap_err();
        assert!(err.starts_with("Error loading types"));
    }
}
