//! Pre-handle filter
//!
//! In pre-handle mode only scenarios that are safe before the target's
//! heavyweight resource exists may run: property accessors by convention, plus
//! anything explicitly marked.

use crate::error::{Error, Result};
use pme_meta::{ExecutionMode, ScenarioDescriptor, ScenarioKind};

const ACCESSOR_PREFIXES: [&str; 2] = ["get_", "set_"];

/// Fail on the first scenario that carries more than one marker
///
/// # Errors
///
/// Returns [`Error::DuplicatePreHandleMarker`].
pub fn validate_markers<'a>(scenarios: impl IntoIterator<Item = &'a ScenarioDescriptor>) -> Result<()> {
    match scenarios
        .into_iter()
        .find(|s| s.pre_handle_markers.len() > 1)
    {
        Some(s) => Err(Error::DuplicatePreHandleMarker {
            scenario: s.qualified_name(),
        }),
        None => Ok(()),
    }
}

/// Whether the naming convention alone admits `scenario`
#[must_use]
pub fn is_accessor_scenario(scenario: &ScenarioDescriptor) -> bool {
    scenario.kind == ScenarioKind::Property
        || ACCESSOR_PREFIXES
            .iter()
            .any(|p| scenario.member_name().starts_with(p))
}

/// Whether `scenario` runs in pre-handle mode
#[must_use]
pub fn should_run_in_pre_handle_mode(scenario: &ScenarioDescriptor) -> bool {
    match scenario.execution_mode() {
        ExecutionMode::PreHandleOnly => true,
        ExecutionMode::PostHandleOnly => false,
        ExecutionMode::Normal => is_accessor_scenario(scenario),
    }
}

/// Splits scenarios into those to run and those excluded up front
#[derive(Debug, Clone, Copy, Default)]
pub struct PreHandleFilter {
    enabled: bool,
}

impl PreHandleFilter {
    /// Filter active only when `enabled`
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Whether pre-handle mode is on
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether `scenario` may run under this filter
    #[must_use]
    pub fn admits(&self, scenario: &ScenarioDescriptor) -> bool {
        !self.enabled || should_run_in_pre_handle_mode(scenario)
    }

    /// `(run, excluded)`, each keeping the input order
    #[must_use]
    pub fn partition(
        &self,
        scenarios: Vec<ScenarioDescriptor>,
    ) -> (Vec<ScenarioDescriptor>, Vec<ScenarioDescriptor>) {
        scenarios.into_iter().partition(|s| self.admits(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> ScenarioDescriptor {
        ScenarioDescriptor::builder(name, "XWidget").build()
    }

    #[test]
    fn test_accessor_runs_by_default() {
        assert!(should_run_in_pre_handle_mode(&named("get_Foo")));
        assert!(should_run_in_pre_handle_mode(&named("set_Foo")));
    }

    #[test]
    fn test_method_excluded_by_default() {
        assert!(!should_run_in_pre_handle_mode(&named("ComputeLayout")));
    }

    #[test]
    fn test_markers_flip_the_convention() {
        let forced_out = ScenarioDescriptor::builder("get_Foo", "XWidget")
            .post_handle_only()
            .build();
        assert!(!should_run_in_pre_handle_mode(&forced_out));

        let forced_in = ScenarioDescriptor::builder("ComputeLayout", "XWidget")
            .pre_handle_only()
            .build();
        assert!(should_run_in_pre_handle_mode(&forced_in));
    }

    #[test]
    fn test_property_kind_counts_as_accessor() {
        let s = ScenarioDescriptor::builder("Text", "XWidget").property().build();
        assert!(should_run_in_pre_handle_mode(&s));
        let e = ScenarioDescriptor::builder("Click", "XWidget").event().build();
        assert!(!should_run_in_pre_handle_mode(&e));
    }

    #[test]
    fn test_duplicate_marker_is_rejected() {
        let ok = named("get_Foo");
        let bad = ScenarioDescriptor::builder("get_Size", "XWidget")
            .pre_handle_only()
            .post_handle_only()
            .build();
        assert!(validate_markers([&ok]).is_ok());
        let err = validate_markers([&ok, &bad]).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicatePreHandleMarker { ref scenario } if scenario == "XWidget.get_Size()"
        ));
    }

    #[test]
    fn test_partition_keeps_order() {
        let filter = PreHandleFilter::new(true);
        let (run, excluded) = filter.partition(vec![
            named("get_A"),
            named("Layout"),
            named("set_B"),
            named("Paint"),
        ]);
        let run: Vec<&str> = run.iter().map(|s| s.name.as_str()).collect();
        let excluded: Vec<&str> = excluded.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(run, vec!["get_A", "set_B"]);
        assert_eq!(excluded, vec!["Layout", "Paint"]);
    }

    #[test]
    fn test_disabled_filter_admits_everything() {
        let filter = PreHandleFilter::default();
        assert!(!filter.is_enabled());
        assert!(filter.admits(&named("ComputeLayout")));
    }
}
