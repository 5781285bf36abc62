//! Conformance runner
//!
//! Drives one run end to end: validate configuration, generate probes, build
//! groups, execute each group's scenarios in order against a live target and
//! close the group through the [`CoverageAccountant`].

use crate::accountant::{CoverageAccountant, CoverageReport, GroupResult};
use crate::autotest::{AutoProbe, AutoTestGenerator, GeneratedScenario};
use crate::error::{Error, Result};
use crate::evidence::{Outcome, ScenarioOutcome};
use crate::grouping::{GroupingEngine, ScenarioGroup, pair_levels};
use crate::policy::RunPolicies;
use crate::prehandle::{self, PreHandleFilter};
use crate::scenario::{ScenarioContext, ScenarioError, ScenarioRegistry, ScenarioResult};
use pme_meta::{ProbeFailure, ScenarioDescriptor, Target, TypeMetadata, TypeRef, Value};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{BTreeMap, VecDeque};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Creates a fresh live target
pub type TargetFactory<'f> = dyn FnMut() -> std::result::Result<Box<dyn Target>, ProbeFailure> + 'f;

/// Where a grouped scenario's body lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Runnable {
    /// Index into the [`ScenarioRegistry`]
    Hand(usize),
    /// Index into the generated probes
    Generated(usize),
}

/// Runs a test suite against a target type
pub struct ConformanceRunner<'a> {
    meta: &'a dyn TypeMetadata,
    policies: RunPolicies,
}

impl<'a> ConformanceRunner<'a> {
    /// Runner with `policies`
    #[must_use]
    pub fn new(meta: &'a dyn TypeMetadata, policies: RunPolicies) -> Self {
        Self { meta, policies }
    }

    /// Policies in force
    #[must_use]
    pub fn policies(&self) -> &RunPolicies {
        &self.policies
    }

    /// Run every group of `suite` against targets made by `factory`.
    ///
    /// # Errors
    ///
    /// Returns an error on misconfiguration (contradictory policies, duplicate
    /// pre-handle markers, an event with no trigger), an unknown type, or a
    /// target that cannot be created. Scenario failures are never errors.
    pub fn run(
        &self,
        target_type: &TypeRef,
        suite_type: &TypeRef,
        scenarios: &mut ScenarioRegistry,
        factory: &mut TargetFactory<'_>,
    ) -> Result<CoverageReport> {
        let policies = &self.policies;
        policies.validate()?;

        let hand_written = scenarios.descriptors();
        prehandle::validate_markers(&hand_written)?;

        let seed = policies.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        info!(target = %target_type, suite = %suite_type, seed, "starting conformance run");

        let levels = pair_levels(self.meta, target_type, suite_type);
        let generated: Vec<GeneratedScenario> = if policies.generates_probes() {
            AutoTestGenerator::new(self.meta, policies).generate(
                target_type,
                &levels,
                &hand_written,
                scenarios,
            )?
        } else {
            Vec::new()
        };

        let mut runnables: BTreeMap<(bool, String), VecDeque<Runnable>> = BTreeMap::new();
        let mut all_scenarios = Vec::new();
        if policies.auto_test_only {
            info!(skipped = hand_written.len(), "auto-test only: hand-written scenarios skipped");
        } else {
            for (index, descriptor) in hand_written.iter().enumerate() {
                runnables
                    .entry((false, descriptor.qualified_name()))
                    .or_default()
                    .push_back(Runnable::Hand(index));
                all_scenarios.push(descriptor.clone());
            }
        }
        for (index, g) in generated.iter().enumerate() {
            runnables
                .entry((true, g.descriptor.qualified_name()))
                .or_default()
                .push_back(Runnable::Generated(index));
            all_scenarios.push(g.descriptor.clone());
        }

        let mut groups = GroupingEngine::new(self.meta)
            .with_exclusions(policies.exclusions.clone())
            .build_groups(target_type, suite_type, &all_scenarios)?;

        let mut target = create_target(factory)?;
        let mut report = CoverageReport::new(
            target_type.clone(),
            suite_type.clone(),
            seed,
            policies.clone(),
        );
        let accountant = CoverageAccountant::from_policies(policies);
        let filter = PreHandleFilter::new(policies.pre_handle_mode);

        for index in 0..groups.len() {
            let ancestor_level = groups[index].suite_type != *suite_type;
            info!(group = %groups[index].name, "running group");

            let ordered = order_scenarios(groups[index].implemented_scenarios.clone());
            let mut outcomes = Vec::with_capacity(ordered.len());
            let mut stop = false;

            for descriptor in &ordered {
                let name = self.display_name(descriptor);
                let group_name = groups[index].name.clone();

                let exclusion = if policies.exclude_ancestors && ancestor_level {
                    Some("ancestor scenarios excluded")
                } else if !filter.admits(descriptor) {
                    Some("not eligible in pre-handle mode")
                } else {
                    None
                };
                if let Some(reason) = exclusion {
                    info!(scenario = %name, group = %group_name, reason, "ExcludedScenario");
                    apply_override(&mut groups[index..], descriptor);
                    outcomes.push(
                        ScenarioOutcome::excluded(name, group_name, reason)
                            .generated(descriptor.generated),
                    );
                    continue;
                }

                let Some(runnable) = runnables
                    .get_mut(&(descriptor.generated, descriptor.qualified_name()))
                    .and_then(VecDeque::pop_front)
                else {
                    warn!(scenario = %name, "grouped scenario has no body");
                    continue;
                };

                let start = Instant::now();
                let (outcome, failures, notes) = match runnable {
                    Runnable::Hand(i) => {
                        self.run_hand_written(i, descriptor, target.as_mut(), &mut rng, scenarios)
                    }
                    Runnable::Generated(i) => classify(Ok(generated[i].probe.run(
                        target.as_mut(),
                        self.meta,
                        &mut rng,
                        policies,
                        scenarios,
                    ))),
                };
                let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                apply_override(&mut groups[index..], descriptor);
                log_outcome(&name, outcome, &failures, &notes);

                let mut record = ScenarioOutcome::new(name, group_name, outcome)
                    .generated(descriptor.generated)
                    .with_duration_ms(duration_ms);
                record.failures = failures;
                record.notes = notes;
                outcomes.push(record);

                if filter.is_enabled() && target.is_realized() {
                    debug!(scenario = %descriptor.qualified_name(), "target realized, recreating");
                    target = create_target(factory)?;
                }

                if outcome == Outcome::Fatal {
                    error!(group = %groups[index].name, "fatal scenario failure, skipping rest of group");
                    break;
                }
                if outcome.is_fail() && policies.stop_on_scenario_failure {
                    stop = true;
                    break;
                }
            }

            let result = accountant.close_with_outcomes(&groups[index], outcomes);
            log_group(&result);
            let continue_run = result.continue_run && !stop;
            report.groups.push(result);

            if !continue_run {
                report.groups_not_run = groups[index + 1..].iter().map(|g| g.name.clone()).collect();
                if !report.groups_not_run.is_empty() {
                    warn!(groups = ?report.groups_not_run, "run stopped early, groups not called");
                }
                break;
            }
        }

        report.finished_at = chrono::Utc::now();
        info!(
            total = report.total(),
            passed = report.passed(),
            failed = report.failed(),
            excluded = report.excluded(),
            tolerated = report.tolerated(),
            "conformance run finished"
        );
        Ok(report)
    }

    fn display_name(&self, descriptor: &ScenarioDescriptor) -> String {
        if self.policies.full_names {
            descriptor.qualified_name()
        } else {
            descriptor.signature()
        }
    }

    fn run_hand_written(
        &self,
        index: usize,
        descriptor: &ScenarioDescriptor,
        target: &mut dyn Target,
        rng: &mut StdRng,
        scenarios: &mut ScenarioRegistry,
    ) -> (Outcome, Vec<String>, Vec<String>) {
        let Some(scenario) = scenarios.scenario_mut(index) else {
            return (
                Outcome::Fatal,
                vec![format!("no scenario registered at index {index}")],
                Vec::new(),
            );
        };
        let args: Vec<Value> = descriptor
            .parameter_types
            .iter()
            .map(|ty| self.meta.default_value(ty))
            .collect();
        let mut ctx = ScenarioContext {
            target,
            meta: self.meta,
            rng,
            args,
            descriptor,
        };
        classify(scenario.run(&mut ctx))
    }
}

/// Run `scenarios` of `suite_type` against `target_type` under `policies`
///
/// # Errors
///
/// See [`ConformanceRunner::run`].
pub fn run_conformance_suite(
    meta: &dyn TypeMetadata,
    target_type: &TypeRef,
    suite_type: &TypeRef,
    scenarios: &mut ScenarioRegistry,
    factory: &mut TargetFactory<'_>,
    policies: RunPolicies,
) -> Result<CoverageReport> {
    ConformanceRunner::new(meta, policies).run(target_type, suite_type, scenarios, factory)
}

fn create_target(factory: &mut TargetFactory<'_>) -> Result<Box<dyn Target>> {
    factory().map_err(|e| Error::TargetCreation(e.to_string()))
}

/// Explicitly ordered scenarios first (stable by order), then the rest in
/// discovery order
fn order_scenarios(mut scenarios: Vec<ScenarioDescriptor>) -> Vec<ScenarioDescriptor> {
    scenarios.sort_by_key(|s| s.order.map_or((1, 0), |o| (0, o)));
    scenarios
}

/// Clear the operation `descriptor` overrides from every group still open
fn apply_override(open_groups: &mut [ScenarioGroup], descriptor: &ScenarioDescriptor) {
    let Some(op) = &descriptor.overrides else {
        return;
    };
    for group in open_groups {
        if group.apply_override(op) {
            info!(
                scenario = %descriptor.qualified_name(),
                operation = %op.qualified_name(),
                group = %group.name,
                "OverrideScenario"
            );
        }
    }
}

/// Map a probe result onto an outcome with its messages
fn classify(
    result: std::result::Result<ScenarioResult, ScenarioError>,
) -> (Outcome, Vec<String>, Vec<String>) {
    match result {
        Ok(r) => {
            let outcome = if !r.is_pass() {
                Outcome::Failed
            } else if r.is_tolerated() {
                Outcome::Tolerated
            } else {
                Outcome::Passed
            };
            let (failures, notes) = r.into_parts();
            (outcome, failures, notes)
        }
        Err(e) if e.is_permission_denied() => (Outcome::Tolerated, Vec::new(), vec![e.to_string()]),
        Err(e) if e.is_argument_validation() => (Outcome::Failed, vec![e.to_string()], Vec::new()),
        Err(e) => (Outcome::Fatal, vec![e.to_string()], Vec::new()),
    }
}

fn log_outcome(name: &str, outcome: Outcome, failures: &[String], notes: &[String]) {
    match outcome {
        Outcome::Passed | Outcome::Excluded => debug!(scenario = %name, %outcome, "scenario finished"),
        Outcome::Tolerated => {
            info!(scenario = %name, notes = ?notes, "tolerated permission denial");
        }
        Outcome::Failed | Outcome::Fatal => {
            warn!(scenario = %name, %outcome, failures = ?failures, "scenario failed");
        }
    }
}

fn log_group(result: &GroupResult) {
    for missing in &result.missing {
        warn!(group = %result.name, operation = %missing, "missing scenario");
    }
    for extra in &result.extra {
        info!(group = %result.name, scenario = %extra, "extra scenario");
    }
    info!(
        group = %result.name,
        total = result.total,
        passed = result.passed,
        failed = result.failed,
        excluded = result.excluded,
        tolerated = result.tolerated,
        "group closed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ExclusionSet;
    use pme_meta::{InMemoryTarget, OperationDescriptor, TypeDefinition, TypeRegistry, ValueKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .with_type(TypeDefinition::new("Base").read_only_property("Id", ValueKind::Int))
            .with_type(
                TypeDefinition::new("Widget")
                    .ancestor("Base")
                    .property("Name", ValueKind::Str)
                    .property("Enabled", ValueKind::Bool),
            )
            .with_type(TypeDefinition::new("XBase"))
            .with_type(TypeDefinition::new("XWidget").ancestor("XBase"))
    }

    fn suite() -> ScenarioRegistry {
        ScenarioRegistry::new()
            .with_scenario(
                ScenarioDescriptor::builder("Name", "XWidget").property().build(),
                |ctx| {
                    ctx.set("Name", Value::Str("probe".into()))?;
                    let mut r = ScenarioResult::new();
                    r.check(ctx.get("Name")? == Value::Str("probe".into()), "Name did not round-trip");
                    Ok(r)
                },
            )
            .with_scenario(
                ScenarioDescriptor::builder("Id", "XBase").property().build(),
                |ctx| {
                    let mut r = ScenarioResult::new();
                    r.check(ctx.get("Id")? == Value::Int(0), "Id not zero");
                    Ok(r)
                },
            )
    }

    fn run(
        reg: &TypeRegistry,
        scenarios: &mut ScenarioRegistry,
        policies: RunPolicies,
    ) -> Result<CoverageReport> {
        let mut factory = || -> std::result::Result<Box<dyn Target>, ProbeFailure> {
            InMemoryTarget::from_metadata(reg, &TypeRef::new("Widget"))
                .map(|t| Box::new(t) as Box<dyn Target>)
                .map_err(|e| ProbeFailure::Other(e.to_string()))
        };
        run_conformance_suite(
            reg,
            &TypeRef::new("Widget"),
            &TypeRef::new("XWidget"),
            scenarios,
            &mut factory,
            policies.with_seed(42),
        )
    }

    #[test]
    fn test_end_to_end_with_generated_probe() {
        let reg = registry();
        let report = run(&reg, &mut suite(), RunPolicies::default()).unwrap();

        assert_eq!(report.groups.len(), 2);
        let widget = report.group("XWidget").unwrap();
        assert!(widget.missing.is_empty());
        assert_eq!(widget.total, 2);
        assert_eq!(widget.passed, 2);
        assert!(widget.outcomes.iter().any(|o| o.generated && o.scenario == "Enabled()"));

        let base = report.group("XBase").unwrap();
        assert_eq!(base.total, 1);
        assert!(report.is_pass());
        assert_eq!(report.seed, 42);
        assert!(report.outcomes().all(|o| o.duration_ms < 60_000));
    }

    #[test]
    fn test_without_generator_enabled_is_missing() {
        let reg = registry();
        let policies = RunPolicies {
            auto_test: false,
            ..RunPolicies::default()
        };
        let report = run(&reg, &mut suite(), policies).unwrap();
        let widget = report.group("XWidget").unwrap();
        assert_eq!(widget.missing, vec!["Widget.Enabled()".to_string()]);
        assert_eq!(widget.total, 2);
        assert_eq!(widget.failed, 1);
        assert!(!report.is_pass());
    }

    #[test]
    fn test_excluded_property_is_neither_probed_nor_missing() {
        let reg = registry();
        let policies = RunPolicies::default()
            .with_exclusions(ExclusionSet::new().exclude_property("Enabled"));
        let report = run(&reg, &mut suite(), policies).unwrap();
        let widget = report.group("XWidget").unwrap();
        assert!(widget.missing.is_empty());
        assert_eq!(widget.total, 1);
        assert!(report.outcomes().all(|o| !o.generated));
    }

    #[test]
    fn test_ignore_missing_keeps_listing() {
        let reg = registry();
        let policies = RunPolicies {
            auto_test: false,
            ignore_missing: true,
            ..RunPolicies::default()
        };
        let report = run(&reg, &mut suite(), policies).unwrap();
        assert_eq!(report.missing_count(), 1);
        assert_eq!(report.failed(), 0);
    }

    #[test]
    fn test_pre_handle_mode_excludes_methods() {
        let reg = registry();
        let mut scenarios = suite().with_scenario(
            ScenarioDescriptor::builder("Layout", "XWidget").build(),
            |_| Ok(ScenarioResult::failed("must not run")),
        );
        let report = run(&reg, &mut scenarios, RunPolicies::default().with_pre_handle_mode(true)).unwrap();
        let widget = report.group("XWidget").unwrap();
        assert_eq!(widget.excluded, 1);
        assert_eq!(widget.failed, 0);
        let layout = widget.outcomes.iter().find(|o| o.scenario == "Layout()").unwrap();
        assert_eq!(layout.outcome, Outcome::Excluded);
    }

    #[test]
    fn test_pre_handle_mode_recreates_realized_target() {
        let reg = registry();
        let created = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&created);
        let mut factory = move || -> std::result::Result<Box<dyn Target>, ProbeFailure> {
            *counter.borrow_mut() += 1;
            InMemoryTarget::from_metadata(&registry(), &TypeRef::new("Widget"))
                .map(|t| Box::new(t.realizes_on("Realize")) as Box<dyn Target>)
                .map_err(|e| ProbeFailure::Other(e.to_string()))
        };
        let mut scenarios = ScenarioRegistry::new().with_scenario(
            ScenarioDescriptor::builder("get_Handle", "XWidget").build(),
            |ctx| {
                ctx.invoke("Realize", &[])?;
                Ok(ScenarioResult::pass())
            },
        );
        let policies = RunPolicies {
            auto_test: false,
            ignore_missing: true,
            pre_handle_mode: true,
            ..RunPolicies::default()
        };
        let report = run_conformance_suite(
            &reg,
            &TypeRef::new("Widget"),
            &TypeRef::new("XWidget"),
            &mut scenarios,
            &mut factory,
            policies,
        )
        .unwrap();
        assert!(report.is_pass());
        assert_eq!(*created.borrow(), 2);
    }

    #[test]
    fn test_duplicate_marker_aborts_before_running() {
        let reg = registry();
        let ran = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&ran);
        let mut scenarios = ScenarioRegistry::new().with_scenario(
            ScenarioDescriptor::builder("Name", "XWidget")
                .pre_handle_only()
                .post_handle_only()
                .build(),
            move |_| {
                *flag.borrow_mut() = true;
                Ok(ScenarioResult::pass())
            },
        );
        let err = run(&reg, &mut scenarios, RunPolicies::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicatePreHandleMarker { .. }));
        assert!(!*ran.borrow());
    }

    #[test]
    fn test_fatal_scenario_skips_rest_of_group_only() {
        let reg = registry();
        let mut scenarios = ScenarioRegistry::new()
            .with_scenario(
                ScenarioDescriptor::builder("Name", "XWidget").property().order(0).build(),
                |_| Err(ScenarioError::Aborted("boom".into())),
            )
            .with_scenario(
                ScenarioDescriptor::builder("Enabled", "XWidget").property().order(1).build(),
                |_| Ok(ScenarioResult::pass()),
            )
            .with_scenario(
                ScenarioDescriptor::builder("Id", "XBase").property().build(),
                |_| Ok(ScenarioResult::pass()),
            );
        let report = run(&reg, &mut scenarios, RunPolicies::default()).unwrap();
        let widget = report.group("XWidget").unwrap();
        assert_eq!(widget.outcomes.len(), 1);
        assert_eq!(widget.outcomes[0].outcome, Outcome::Fatal);
        assert_eq!(widget.failed, 1);
        assert_eq!(report.group("XBase").unwrap().passed, 1);
    }

    #[test]
    fn test_permission_denied_scenario_is_tolerated() {
        let reg = registry();
        let mut scenarios = ScenarioRegistry::new().with_scenario(
            ScenarioDescriptor::builder("Id", "XBase").property().build(),
            |_| Err(ProbeFailure::PermissionDenied("Id".into()).into()),
        );
        let policies = RunPolicies {
            ignore_missing: true,
            ..RunPolicies::default()
        };
        let report = run(&reg, &mut scenarios, policies).unwrap();
        let base = report.group("XBase").unwrap();
        assert_eq!(base.tolerated, 1);
        assert_eq!(base.total, 0);
    }

    #[test]
    fn test_stop_on_scenario_failure_records_groups_not_run() {
        let reg = registry();
        let mut scenarios = ScenarioRegistry::new()
            .with_scenario(
                ScenarioDescriptor::builder("Name", "XWidget").property().build(),
                |_| Ok(ScenarioResult::failed("wrong")),
            )
            .with_scenario(
                ScenarioDescriptor::builder("Id", "XBase").property().build(),
                |_| Ok(ScenarioResult::pass()),
            );
        let policies = RunPolicies {
            stop_on_scenario_failure: true,
            ..RunPolicies::default()
        };
        let report = run(&reg, &mut scenarios, policies).unwrap();
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups_not_run, vec!["XBase".to_string()]);
        assert!(report.stopped_early());
        assert!(!report.is_pass());
    }

    #[test]
    fn test_stop_on_group_failure() {
        let reg = registry();
        let policies = RunPolicies {
            auto_test: false,
            stop_on_group_failure: true,
            ..RunPolicies::default()
        };
        let report = run(&reg, &mut suite(), policies).unwrap();
        assert_eq!(report.groups_not_run, vec!["XBase".to_string()]);
    }

    #[test]
    fn test_exclude_ancestors_keeps_totals_stable() {
        // Excluded scenarios are credited as passes, so a scenario that never
        // ran cannot be told apart from one that passed in the counts alone.
        let reg = registry();
        let full = run(&reg, &mut suite(), RunPolicies::default()).unwrap();
        let policies = RunPolicies {
            exclude_ancestors: true,
            ..RunPolicies::default()
        };
        let filtered = run(&reg, &mut suite(), policies).unwrap();

        assert_eq!(full.total(), filtered.total());
        assert_eq!(full.passed(), filtered.passed());
        let base = filtered.group("XBase").unwrap();
        assert_eq!(base.excluded, 1);
        assert_eq!(base.executed(), 0);
    }

    #[test]
    fn test_override_clears_missing_in_other_group() {
        let reg = registry();
        let mut scenarios = ScenarioRegistry::new().with_scenario(
            ScenarioDescriptor::builder("IdentityCheck", "XWidget")
                .overrides(OperationDescriptor::property("Id", "Base"))
                .build(),
            |_| Ok(ScenarioResult::pass()),
        );
        let policies = RunPolicies {
            auto_test: false,
            ..RunPolicies::default()
        };
        let report = run(&reg, &mut scenarios, policies).unwrap();
        assert!(report.group("XBase").unwrap().missing.is_empty());
        assert_eq!(
            report.group("XWidget").unwrap().extra,
            vec!["XWidget.IdentityCheck()".to_string()]
        );
    }

    #[test]
    fn test_excluded_override_still_clears_missing() {
        let reg = registry();
        let mut scenarios = ScenarioRegistry::new().with_scenario(
            ScenarioDescriptor::builder("IdentityCheck", "XWidget")
                .overrides(OperationDescriptor::property("Id", "Base"))
                .build(),
            |_| Ok(ScenarioResult::failed("must not run")),
        );
        let policies = RunPolicies {
            auto_test: false,
            pre_handle_mode: true,
            ..RunPolicies::default()
        };
        let report = run(&reg, &mut scenarios, policies).unwrap();

        let widget = report.group("XWidget").unwrap();
        assert_eq!(widget.excluded, 1);
        let check = widget
            .outcomes
            .iter()
            .find(|o| o.scenario == "IdentityCheck()")
            .unwrap();
        assert_eq!(check.outcome, Outcome::Excluded);
        assert!(report.group("XBase").unwrap().missing.is_empty());
    }

    #[test]
    fn test_auto_test_only_skips_hand_written() {
        let reg = registry();
        let policies = RunPolicies {
            auto_test_only: true,
            ..RunPolicies::default()
        };
        let report = run(&reg, &mut suite(), policies).unwrap();
        assert!(report.outcomes().all(|o| o.generated));
        assert_eq!(report.failed(), 0);
        assert_eq!(report.group("XWidget").unwrap().total, 2);
    }

    #[test]
    fn test_probe_arguments_are_synthesized() {
        let reg = registry();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut scenarios = ScenarioRegistry::new().with_scenario(
            ScenarioDescriptor::builder("Resize", "XWidget")
                .param("Int32")
                .param("Boolean")
                .param("String")
                .build(),
            move |ctx| {
                sink.borrow_mut().extend(ctx.args.clone());
                Ok(ScenarioResult::pass())
            },
        );
        let policies = RunPolicies {
            auto_test: false,
            ignore_missing: true,
            ..RunPolicies::default()
        };
        run(&reg, &mut scenarios, policies).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![Value::Int(0), Value::Bool(false), Value::Null]
        );
    }

    #[test]
    fn test_ordered_scenarios_run_first() {
        let a = ScenarioDescriptor::builder("A", "X").build();
        let b = ScenarioDescriptor::builder("B", "X").order(2).build();
        let c = ScenarioDescriptor::builder("C", "X").order(1).build();
        let names: Vec<String> = order_scenarios(vec![a, b, c])
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }
}
