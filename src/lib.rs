//! PME Conformance
//!
//! Facade over the workspace crates of the properties/methods/events
//! conformance and coverage harness.
//!
//! - [`meta`]: type metadata, scenario descriptors and live targets
//! - [`engine`]: grouping, matching, probe generation and the runner
//! - [`report`]: Markdown, JUnit, JSON and `results.txt` output

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use pme_engine as engine;
pub use pme_meta as meta;
pub use pme_report as report;

pub use pme_engine::{ConformanceRunner, CoverageReport, RunPolicies, ScenarioRegistry, run_conformance_suite};
pub use pme_meta::{InMemoryTarget, Target, TypeRef, TypeRegistry};
pub use pme_report::write_reports;
