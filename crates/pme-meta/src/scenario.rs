//! Scenario descriptors
//!
//! A scenario is a probe that exercises one member of the API under test. Its
//! descriptor carries everything the engine needs to pair it with a member and
//! decide whether to run it; the probe body lives with the engine.

use crate::types::{OperationDescriptor, TypeRef, format_signature, member_name_of};
use serde::{Deserialize, Serialize};

/// Pre-handle execution marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// No marker; the naming convention decides
    #[default]
    Normal,
    /// Force inclusion in pre-handle mode
    PreHandleOnly,
    /// Force exclusion in pre-handle mode
    PostHandleOnly,
}

/// What kind of member a scenario probes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    /// Method probe
    #[default]
    Method,
    /// Property probe
    Property,
    /// Event probe
    Event,
}

/// Metadata for one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDescriptor {
    /// Scenario name; pairs with the member name
    pub name: String,
    /// Test-suite type that declares the scenario
    pub declaring_type: TypeRef,
    /// Probe parameter types (the leading test-context parameter is implicit)
    #[serde(default)]
    pub parameter_types: Vec<TypeRef>,
    /// Member kind probed
    #[serde(default)]
    pub kind: ScenarioKind,
    /// Pre-handle markers attached by the author; at most one is valid
    #[serde(default)]
    pub pre_handle_markers: Vec<ExecutionMode>,
    /// Member this scenario covers out-of-band
    #[serde(default)]
    pub overrides: Option<OperationDescriptor>,
    /// Explicit execution order within the group
    #[serde(default)]
    pub order: Option<i32>,
    /// Free-form description logged when the scenario starts
    #[serde(default)]
    pub description: Option<String>,
    /// Synthesized by the auto-test generator
    #[serde(default)]
    pub generated: bool,
}

impl ScenarioDescriptor {
    /// Start building a scenario
    #[must_use]
    pub fn builder(name: impl Into<String>, declaring_type: impl Into<TypeRef>) -> ScenarioBuilder {
        ScenarioBuilder {
            descriptor: Self {
                name: name.into(),
                declaring_type: declaring_type.into(),
                parameter_types: Vec::new(),
                kind: ScenarioKind::Method,
                pre_handle_markers: Vec::new(),
                overrides: None,
                order: None,
                description: None,
                generated: false,
            },
        }
    }

    /// Name after the last qualifying separator
    #[must_use]
    pub fn member_name(&self) -> &str {
        member_name_of(&self.name)
    }

    /// Execution mode from the single marker; `Normal` when unmarked.
    ///
    /// Multiple markers are a configuration error the engine rejects before a
    /// run starts; this accessor reports the first.
    #[must_use]
    pub fn execution_mode(&self) -> ExecutionMode {
        self.pre_handle_markers.first().copied().unwrap_or_default()
    }

    /// `Name(P1, P2)`
    #[must_use]
    pub fn signature(&self) -> String {
        format_signature(&self.name, &self.parameter_types)
    }

    /// `DeclaringType.Name(P1, P2)`
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_type, self.signature())
    }
}

/// Builder for [`ScenarioDescriptor`]
#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
    descriptor: ScenarioDescriptor,
}

impl ScenarioBuilder {
    /// Append a probe parameter type
    #[must_use]
    pub fn param(mut self, ty: impl Into<TypeRef>) -> Self {
        self.descriptor.parameter_types.push(ty.into());
        self
    }

    /// Probe a property
    #[must_use]
    pub fn property(mut self) -> Self {
        self.descriptor.kind = ScenarioKind::Property;
        self
    }

    /// Probe an event
    #[must_use]
    pub fn event(mut self) -> Self {
        self.descriptor.kind = ScenarioKind::Event;
        self
    }

    /// Run in pre-handle mode regardless of naming
    #[must_use]
    pub fn pre_handle_only(mut self) -> Self {
        self.descriptor.pre_handle_markers.push(ExecutionMode::PreHandleOnly);
        self
    }

    /// Skip in pre-handle mode regardless of naming
    #[must_use]
    pub fn post_handle_only(mut self) -> Self {
        self.descriptor.pre_handle_markers.push(ExecutionMode::PostHandleOnly);
        self
    }

    /// Cover `operation` even if it is expected at another level
    #[must_use]
    pub fn overrides(mut self, operation: OperationDescriptor) -> Self {
        self.descriptor.overrides = Some(operation);
        self
    }

    /// Explicit execution order
    #[must_use]
    pub fn order(mut self, order: i32) -> Self {
        self.descriptor.order = Some(order);
        self
    }

    /// Description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.descriptor.description = Some(description.into());
        self
    }

    /// Mark as generated
    #[must_use]
    pub fn generated(mut self) -> Self {
        self.descriptor.generated = true;
        self
    }

    /// Finish
    #[must_use]
    pub fn build(self) -> ScenarioDescriptor {
        self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let s = ScenarioDescriptor::builder("Refresh", "XWidget").build();
        assert_eq!(s.kind, ScenarioKind::Method);
        assert_eq!(s.execution_mode(), ExecutionMode::Normal);
        assert!(s.overrides.is_none());
        assert!(!s.generated);
        assert_eq!(s.qualified_name(), "XWidget.Refresh()");
    }

    #[test]
    fn test_builder_params_and_markers() {
        let s = ScenarioDescriptor::builder("Scale", "XWidget")
            .param("Int32")
            .param("Single")
            .post_handle_only()
            .order(3)
            .build();
        assert_eq!(s.signature(), "Scale(Int32, Single)");
        assert_eq!(s.execution_mode(), ExecutionMode::PostHandleOnly);
        assert_eq!(s.order, Some(3));
    }

    #[test]
    fn test_builder_keeps_every_marker() {
        let s = ScenarioDescriptor::builder("get_Size", "XWidget")
            .pre_handle_only()
            .post_handle_only()
            .build();
        assert_eq!(s.pre_handle_markers.len(), 2);
    }

    #[test]
    fn test_descriptor_from_yaml() {
        let s: ScenarioDescriptor = serde_yaml::from_str(
            "name: Text\ndeclaring_type: XWidget\nkind: property\npre_handle_markers: [pre_handle_only]\n",
        )
        .unwrap();
        assert_eq!(s.kind, ScenarioKind::Property);
        assert_eq!(s.execution_mode(), ExecutionMode::PreHandleOnly);
        assert!(s.parameter_types.is_empty());
    }
}
