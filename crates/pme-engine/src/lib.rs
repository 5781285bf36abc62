//! PME Engine
//!
//! Scenario discovery, grouping and matching for the PME conformance harness,
//! plus the generic property/event auto-test generator.
//! Runs are single-threaded and sequential so group and scenario order are
//! reproducible from a fixed seed.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// Allow common patterns
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::module_name_repetitions)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::redundant_closure_for_method_calls))]
#![cfg_attr(test, allow(clippy::redundant_clone))]

pub mod accountant;
pub mod autotest;
pub mod error;
pub mod evidence;
pub mod grouping;
pub mod matcher;
pub mod policy;
pub mod prehandle;
pub mod runner;
pub mod scenario;

pub use accountant::{CoverageAccountant, CoverageReport, GroupResult};
pub use autotest::{AutoProbe, AutoTestGenerator, EventTrigger, GeneratedScenario};
pub use error::{Error, Result};
pub use evidence::{Outcome, ScenarioOutcome};
pub use grouping::{GroupingEngine, HierarchyLevel, ScenarioGroup, pair_levels};
pub use matcher::matches;
pub use policy::{ExclusionSet, RunPolicies};
pub use prehandle::{PreHandleFilter, should_run_in_pre_handle_mode};
pub use runner::{ConformanceRunner, TargetFactory, run_conformance_suite};
pub use scenario::{
    RaiseHook, Scenario, ScenarioContext, ScenarioError, ScenarioFn, ScenarioRegistry,
    ScenarioResult,
};
