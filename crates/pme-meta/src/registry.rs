//! Manifest-backed type registry
//!
//! Stands in for runtime reflection: the API under test and the test-suite
//! hierarchy are described up front, either in YAML or with the builder API,
//! and the registry answers [`TypeMetadata`] queries from that description.
//!
//! ```yaml
//! enums:
//!   - name: Dock
//!     members: [{ name: None, value: 0 }, { name: Fill, value: 5 }]
//! types:
//!   - name: Widget
//!     ancestor: Base
//!     methods:
//!       - { name: Scale, parameters: [Int32, Int32] }
//!       - { name: OnClick, parameters: [EventArgs], visibility: protected }
//!     properties:
//!       - { name: Enabled, type: { kind: bool } }
//!       - { name: Dock, type: { kind: object, type_name: Dock } }
//!     events:
//!       - { name: Click }
//! ```

use crate::error::{Error, Result};
use crate::metadata::TypeMetadata;
use crate::types::{
    EnumInfo, EventDescriptor, OperationDescriptor, OperationKind, PropertyDescriptor, TypeRef,
    ValueKind, Visibility,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

fn default_true() -> bool {
    true
}

fn default_event_args() -> TypeRef {
    TypeRef::new("EventArgs")
}

/// A declared method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSpec {
    /// Method name, possibly qualified
    pub name: String,
    /// Parameter types
    #[serde(default)]
    pub parameters: Vec<TypeRef>,
    /// Static method
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Visibility
    #[serde(default)]
    pub visibility: Visibility,
}

/// A declared property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySpec {
    /// Property name
    pub name: String,
    /// Value shape
    #[serde(rename = "type")]
    pub value_kind: ValueKind,
    /// Has a public getter
    #[serde(default = "default_true")]
    pub readable: bool,
    /// Has a public setter
    #[serde(default = "default_true")]
    pub writable: bool,
}

/// A declared event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSpec {
    /// Event name
    pub name: String,
    /// Event-argument type
    #[serde(default = "default_event_args")]
    pub argument: TypeRef,
}

/// The members one type introduces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Type name
    pub name: TypeRef,
    /// Direct ancestor
    #[serde(default)]
    pub ancestor: Option<TypeRef>,
    /// Methods introduced by this type
    #[serde(default)]
    pub methods: Vec<MethodSpec>,
    /// Properties introduced by this type
    #[serde(default)]
    pub properties: Vec<PropertySpec>,
    /// Events introduced by this type
    #[serde(default)]
    pub events: Vec<EventSpec>,
}

impl TypeDefinition {
    /// Start a definition with no members
    #[must_use]
    pub fn new(name: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ancestor: None,
            methods: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Set the direct ancestor
    #[must_use]
    pub fn ancestor(mut self, ancestor: impl Into<TypeRef>) -> Self {
        self.ancestor = Some(ancestor.into());
        self
    }

    /// Public instance method
    #[must_use]
    pub fn method(mut self, name: &str, params: &[&str]) -> Self {
        self.methods.push(MethodSpec {
            name: name.to_string(),
            parameters: params.iter().map(|p| TypeRef::new(*p)).collect(),
            is_static: false,
            visibility: Visibility::Public,
        });
        self
    }

    /// Public static method
    #[must_use]
    pub fn static_method(mut self, name: &str, params: &[&str]) -> Self {
        self.methods.push(MethodSpec {
            name: name.to_string(),
            parameters: params.iter().map(|p| TypeRef::new(*p)).collect(),
            is_static: true,
            visibility: Visibility::Public,
        });
        self
    }

    /// Protected method (e.g. an `On<Event>` trigger)
    #[must_use]
    pub fn protected_method(mut self, name: &str, params: &[&str]) -> Self {
        self.methods.push(MethodSpec {
            name: name.to_string(),
            parameters: params.iter().map(|p| TypeRef::new(*p)).collect(),
            is_static: false,
            visibility: Visibility::Protected,
        });
        self
    }

    /// Read/write property
    #[must_use]
    pub fn property(mut self, name: &str, value_kind: ValueKind) -> Self {
        self.properties.push(PropertySpec {
            name: name.to_string(),
            value_kind,
            readable: true,
            writable: true,
        });
        self
    }

    /// Read-only property
    #[must_use]
    pub fn read_only_property(mut self, name: &str, value_kind: ValueKind) -> Self {
        self.properties.push(PropertySpec {
            name: name.to_string(),
            value_kind,
            readable: true,
            writable: false,
        });
        self
    }

    /// Event with the given argument type
    #[must_use]
    pub fn event(mut self, name: &str, argument: &str) -> Self {
        self.events.push(EventSpec {
            name: name.to_string(),
            argument: TypeRef::new(argument),
        });
        self
    }

    /// Every member this type introduces, as operations of any visibility
    fn operations(&self) -> impl Iterator<Item = OperationDescriptor> + '_ {
        let methods = self.methods.iter().map(|m| OperationDescriptor {
            name: m.name.clone(),
            declaring_type: self.name.clone(),
            parameter_types: m.parameters.clone(),
            is_static: m.is_static,
            kind: OperationKind::Method,
            visibility: m.visibility,
        });
        let properties = self
            .properties
            .iter()
            .map(|p| OperationDescriptor::property(p.name.clone(), self.name.clone()));
        let events = self
            .events
            .iter()
            .map(|e| OperationDescriptor::event(e.name.clone(), self.name.clone()));
        methods.chain(properties).chain(events)
    }
}

/// On-disk shape of a registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryManifest {
    /// Enumerations referenced by property and parameter types
    #[serde(default)]
    pub enums: Vec<EnumInfo>,
    /// Type definitions, target and test-suite hierarchies alike
    #[serde(default)]
    pub types: Vec<TypeDefinition>,
}

/// Manifest-backed [`TypeMetadata`] implementation
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: BTreeMap<TypeRef, TypeDefinition>,
    enums: BTreeMap<TypeRef, EnumInfo>,
}

impl TypeRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a type definition
    #[must_use]
    pub fn with_type(mut self, definition: TypeDefinition) -> Self {
        self.define(definition);
        self
    }

    /// Add (or replace) an enumeration
    #[must_use]
    pub fn with_enum(mut self, info: EnumInfo) -> Self {
        self.enums.insert(info.name.clone(), info);
        self
    }

    /// Add (or replace) a type definition in place
    pub fn define(&mut self, definition: TypeDefinition) {
        self.types.insert(definition.name.clone(), definition);
    }

    /// Build from a manifest and validate it
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate types, dangling ancestors or cycles.
    pub fn from_manifest(manifest: RegistryManifest) -> Result<Self> {
        let mut registry = Self::new();
        for info in manifest.enums {
            registry.enums.insert(info.name.clone(), info);
        }
        for definition in manifest.types {
            if registry.types.contains_key(&definition.name) {
                return Err(Error::InvalidManifest(format!(
                    "type {} defined more than once",
                    definition.name
                )));
            }
            registry.define(definition);
        }
        registry.validate()?;
        debug!(
            types = registry.types.len(),
            enums = registry.enums.len(),
            "type registry loaded"
        );
        Ok(registry)
    }

    /// Parse a YAML manifest
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or the manifest is invalid.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let manifest: RegistryManifest = serde_yaml::from_str(yaml)?;
        Self::from_manifest(manifest)
    }

    /// Load a YAML manifest from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Export back to the manifest shape
    #[must_use]
    pub fn to_manifest(&self) -> RegistryManifest {
        RegistryManifest {
            enums: self.enums.values().cloned().collect(),
            types: self.types.values().cloned().collect(),
        }
    }

    /// Check that every ancestor is defined and no chain loops
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidManifest`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        for definition in self.types.values() {
            let mut seen = BTreeSet::new();
            seen.insert(definition.name.clone());
            let mut current = definition.ancestor.clone();
            while let Some(ancestor) = current {
                let Some(parent) = self.types.get(&ancestor) else {
                    return Err(Error::InvalidManifest(format!(
                        "{} names undefined ancestor {ancestor}",
                        definition.name
                    )));
                };
                if !seen.insert(ancestor.clone()) {
                    return Err(Error::InvalidManifest(format!(
                        "ancestor chain of {} loops through {ancestor}",
                        definition.name
                    )));
                }
                current = parent.ancestor.clone();
            }
        }
        Ok(())
    }

    /// Look up a definition
    #[must_use]
    pub fn get(&self, ty: &TypeRef) -> Option<&TypeDefinition> {
        self.types.get(ty)
    }

    /// Whether `ty` is defined
    #[must_use]
    pub fn contains(&self, ty: &TypeRef) -> bool {
        self.types.contains_key(ty)
    }

    /// All defined type names
    pub fn type_names(&self) -> impl Iterator<Item = &TypeRef> {
        self.types.keys()
    }

    /// Definitions from `ty` up to the root
    fn chain(&self, ty: &TypeRef) -> Result<Vec<&TypeDefinition>> {
        let first = self
            .types
            .get(ty)
            .ok_or_else(|| Error::UnknownType(ty.to_string()))?;
        let mut chain = vec![first];
        let mut current = first.ancestor.as_ref();
        while let Some(name) = current {
            let Some(definition) = self.types.get(name) else {
                break;
            };
            if chain.iter().any(|d| d.name == definition.name) {
                break;
            }
            chain.push(definition);
            current = definition.ancestor.as_ref();
        }
        Ok(chain)
    }

    /// Resolve enum references in a property's declared kind
    fn resolve_kind(&self, kind: &ValueKind) -> ValueKind {
        match kind {
            ValueKind::Object { type_name } => self
                .value_kind(type_name)
                .unwrap_or_else(|| kind.clone()),
            other => other.clone(),
        }
    }
}

impl TypeMetadata for TypeRegistry {
    fn list_public_operations(&self, ty: &TypeRef) -> Result<Vec<OperationDescriptor>> {
        let mut operations: Vec<OperationDescriptor> = Vec::new();
        for definition in self.chain(ty)? {
            for op in definition.operations() {
                if op.visibility != Visibility::Public {
                    continue;
                }
                let shadowed = operations
                    .iter()
                    .any(|existing| existing.kind == op.kind && existing.same_member(&op));
                if !shadowed {
                    operations.push(op);
                }
            }
        }
        Ok(operations)
    }

    fn list_public_properties(&self, ty: &TypeRef) -> Result<Vec<PropertyDescriptor>> {
        let mut properties: Vec<PropertyDescriptor> = Vec::new();
        for definition in self.chain(ty)? {
            for spec in &definition.properties {
                if properties.iter().any(|p| p.name == spec.name) {
                    continue;
                }
                properties.push(PropertyDescriptor {
                    name: spec.name.clone(),
                    declaring_type: definition.name.clone(),
                    value_kind: self.resolve_kind(&spec.value_kind),
                    readable: spec.readable,
                    writable: spec.writable,
                });
            }
        }
        Ok(properties)
    }

    fn list_public_events(&self, ty: &TypeRef) -> Result<Vec<EventDescriptor>> {
        let mut events: Vec<EventDescriptor> = Vec::new();
        for definition in self.chain(ty)? {
            for spec in &definition.events {
                if events.iter().any(|e| e.name == spec.name) {
                    continue;
                }
                events.push(EventDescriptor {
                    name: spec.name.clone(),
                    declaring_type: definition.name.clone(),
                    argument_type: spec.argument.clone(),
                });
            }
        }
        Ok(events)
    }

    fn ancestor(&self, ty: &TypeRef) -> Option<TypeRef> {
        self.types.get(ty).and_then(|d| d.ancestor.clone())
    }

    fn find_operation(&self, ty: &TypeRef, name: &str) -> Option<OperationDescriptor> {
        let chain = self.chain(ty).ok()?;
        chain.into_iter().find_map(|definition| {
            definition
                .operations()
                .find(|op| op.kind == OperationKind::Method && (op.name == name || op.member_name() == name))
        })
    }

    fn value_kind(&self, ty: &TypeRef) -> Option<ValueKind> {
        self.enums
            .get(ty)
            .map(|info| ValueKind::Enum(info.clone()))
            .or_else(|| ValueKind::from_primitive(ty))
    }
}
