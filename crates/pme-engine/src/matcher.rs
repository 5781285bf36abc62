//! Scenario-to-operation matching
//!
//! A scenario covers an operation when the operation's name after its last
//! qualifying separator equals the scenario's name as written and the probe parameters
//! (the implicit test-context parameter already dropped) equal the operation's
//! parameters exactly, in order.

use pme_meta::{OperationDescriptor, ScenarioDescriptor};

/// Whether `scenario` covers `operation`
#[must_use]
pub fn matches(scenario: &ScenarioDescriptor, operation: &OperationDescriptor) -> bool {
    operation.member_name() == scenario.name
        && scenario.parameter_types == operation.parameter_types
}

/// Whether any scenario in `scenarios` covers `operation`
#[must_use]
pub fn is_covered(operation: &OperationDescriptor, scenarios: &[ScenarioDescriptor]) -> bool {
    scenarios.iter().any(|s| matches(s, operation))
}

/// Whether `scenario` covers any operation in `expected`
#[must_use]
pub fn covers_any(scenario: &ScenarioDescriptor, expected: &[OperationDescriptor]) -> bool {
    expected.iter().any(|op| matches(scenario, op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pme_meta::TypeRef;
    use pme_meta::proptest_impl::{matching_scenario, operation_strategy, parameter_list_strategy};
    use proptest::prelude::*;

    #[test]
    fn test_exact_signature_matches() {
        let op = OperationDescriptor::method("Scale", "Widget", ["Int32", "Int32"]);
        let s = ScenarioDescriptor::builder("Scale", "XWidget")
            .param("Int32")
            .param("Int32")
            .build();
        assert!(matches(&s, &op));
    }

    #[test]
    fn test_interface_qualified_name_matches() {
        let op = OperationDescriptor::method("IComponent.Dispose", "Widget", Vec::<TypeRef>::new());
        let s = ScenarioDescriptor::builder("Dispose", "XWidget").build();
        assert!(matches(&s, &op));
    }

    #[test]
    fn test_qualified_scenario_name_does_not_match() {
        let op = OperationDescriptor::method("Dispose", "Widget", Vec::<TypeRef>::new());
        let s = ScenarioDescriptor::builder("Unrelated.Dispose", "XWidget").build();
        assert!(!matches(&s, &op));
        let qualified = OperationDescriptor::method("IComponent.Dispose", "Widget", Vec::<TypeRef>::new());
        assert!(!matches(&s, &qualified));
    }

    #[test]
    fn test_parameter_count_mismatch() {
        let op = OperationDescriptor::method("Scale", "Widget", ["Int32"]);
        let s = ScenarioDescriptor::builder("Scale", "XWidget").build();
        assert!(!matches(&s, &op));
    }

    #[test]
    fn test_no_parameter_variance() {
        let op = OperationDescriptor::method("Draw", "Widget", ["PaintEventArgs"]);
        let s = ScenarioDescriptor::builder("Draw", "XWidget").param("EventArgs").build();
        assert!(!matches(&s, &op));
    }

    #[test]
    fn test_name_is_case_sensitive() {
        let op = OperationDescriptor::method("Refresh", "Widget", Vec::<TypeRef>::new());
        let s = ScenarioDescriptor::builder("refresh", "XWidget").build();
        assert!(!matches(&s, &op));
    }

    #[test]
    fn test_property_scenario_covers_property_operation() {
        let op = OperationDescriptor::property("Name", "Widget");
        let s = ScenarioDescriptor::builder("Name", "XWidget").property().build();
        assert!(is_covered(&op, &[s.clone()]));
        assert!(covers_any(&s, &[op]));
    }

    proptest! {
        #[test]
        fn prop_mirrored_scenario_always_matches(op in operation_strategy("Widget")) {
            let s = matching_scenario(&op, "XWidget");
            prop_assert!(matches(&s, &op));
        }

        #[test]
        fn prop_different_parameters_never_match(
            op in operation_strategy("Widget"),
            params in parameter_list_strategy(),
        ) {
            prop_assume!(params != op.parameter_types);
            let mut s = matching_scenario(&op, "XWidget");
            s.parameter_types = params;
            prop_assert!(!matches(&s, &op));
        }
    }
}
