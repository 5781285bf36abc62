//! Proptest strategies for property-based testing
//!
//! Generates member names, signatures and matching scenario/operation pairs.

use crate::scenario::ScenarioDescriptor;
use crate::types::{EnumInfo, OperationDescriptor, TypeRef};
use proptest::prelude::*;

/// Strategy for generating parameter types
pub fn type_ref_strategy() -> impl Strategy<Value = TypeRef> {
    prop::sample::select(vec![
        "Boolean",
        "Int32",
        "String",
        "Single",
        "EventArgs",
        "Point",
        "Size",
        "Color",
    ])
    .prop_map(TypeRef::new)
}

/// Strategy for generating member names
pub fn member_name_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "Refresh",
        "Invalidate",
        "Scale",
        "Focus",
        "BringToFront",
        "SendToBack",
        "ResumeLayout",
        "SuspendLayout",
        "Select",
        "Hide",
        "Show",
        "Dispose",
    ])
    .prop_map(str::to_string)
}

/// Strategy for generating parameter lists of up to three types
pub fn parameter_list_strategy() -> impl Strategy<Value = Vec<TypeRef>> {
    prop::collection::vec(type_ref_strategy(), 0..=3)
}

/// Strategy for generating public instance methods declared by `declaring_type`,
/// sometimes under an explicit-interface qualified name
pub fn operation_strategy(declaring_type: &'static str) -> impl Strategy<Value = OperationDescriptor> {
    (
        member_name_strategy(),
        parameter_list_strategy(),
        prop::option::of(prop::sample::select(vec!["IComponent", "IDisposable", "System.IWidget"])),
    )
        .prop_map(move |(name, params, interface)| {
            let name = match interface {
                Some(prefix) => format!("{prefix}.{name}"),
                None => name,
            };
            OperationDescriptor::method(name, declaring_type, params)
        })
}

/// A scenario declared in `suite_type` that covers `op`
#[must_use]
pub fn matching_scenario(op: &OperationDescriptor, suite_type: &str) -> ScenarioDescriptor {
    op.parameter_types
        .iter()
        .cloned()
        .fold(
            ScenarioDescriptor::builder(op.member_name(), suite_type),
            crate::scenario::ScenarioBuilder::param,
        )
        .build()
}

/// Strategy for generating non-flag enumerations with distinct values
pub fn enum_info_strategy() -> impl Strategy<Value = EnumInfo> {
    prop::collection::btree_set(-50i64..50, 1..6).prop_map(|values| {
        let members: Vec<(String, i64)> = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (format!("Member{i}"), v))
            .collect();
        let borrowed: Vec<(&str, i64)> = members.iter().map(|(n, v)| (n.as_str(), *v)).collect();
        EnumInfo::new("Generated", &borrowed)
    })
}
