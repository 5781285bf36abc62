//! Core metadata types
//!
//! Value-like descriptors for the members of the API under test. Descriptors
//! are produced by a [`crate::TypeMetadata`] accessor per introspection call and
//! are never shared mutably.

use serde::{Deserialize, Serialize};

/// Name prefixes of event/serialization plumbing members that are never expected
/// to have a scenario of their own.
const PLUMBING_PREFIXES: [&str; 3] = ["add_", "remove_", "ShouldSerialize"];

/// Reference to a type in either the target hierarchy or the test-suite hierarchy
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(String);

impl TypeRef {
    /// Boolean primitive
    pub const BOOLEAN: &'static str = "Boolean";
    /// 32-bit integer primitive
    pub const INT32: &'static str = "Int32";
    /// String primitive
    pub const STRING: &'static str = "String";

    /// Create a new type reference
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Full type name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name after the last namespace separator
    #[must_use]
    pub fn short_name(&self) -> &str {
        member_name_of(&self.0)
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Strip any qualifying prefix from a member name.
///
/// Explicit interface implementations surface as `IFoo.Bar`; only `Bar` is
/// significant when pairing scenarios with members.
#[must_use]
pub fn member_name_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// A runtime value passed to or read back from a target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    /// Null reference
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// String
    Str(String),
    /// Enumeration value by its underlying integer
    Enum(i64),
    /// Default-constructed object of the given type
    Object(TypeRef),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) | Self::Enum(i) => write!(f, "{i}"),
            Self::Str(s) if s.chars().count() > 32 => {
                let head: String = s.chars().take(32).collect();
                write!(f, "\"{head}...\" ({} chars)", s.chars().count())
            }
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Object(ty) => write!(f, "<{ty}>"),
        }
    }
}

/// A declared enumeration member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    /// Member name
    pub name: String,
    /// Underlying integer value
    pub value: i64,
}

/// Enumeration metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumInfo {
    /// Enumeration type name
    pub name: TypeRef,
    /// Declared members in declaration order
    pub members: Vec<EnumMember>,
    /// Flag-style enumeration (values combine bitwise)
    #[serde(default)]
    pub flags: bool,
}

impl EnumInfo {
    /// Create enumeration metadata from `(name, value)` pairs
    #[must_use]
    pub fn new(name: impl Into<TypeRef>, members: &[(&str, i64)]) -> Self {
        Self {
            name: name.into(),
            members: members
                .iter()
                .map(|(n, v)| EnumMember {
                    name: (*n).to_string(),
                    value: *v,
                })
                .collect(),
            flags: false,
        }
    }

    /// Mark as a flag-style enumeration
    #[must_use]
    pub const fn with_flags(mut self) -> Self {
        self.flags = true;
        self
    }

    /// Lowest declared value
    #[must_use]
    pub fn min(&self) -> Option<i64> {
        self.members.iter().map(|m| m.value).min()
    }

    /// Highest declared value
    #[must_use]
    pub fn max(&self) -> Option<i64> {
        self.members.iter().map(|m| m.value).max()
    }

    /// Whether `value` is a declared member
    #[must_use]
    pub fn contains(&self, value: i64) -> bool {
        self.members.iter().any(|m| m.value == value)
    }
}

/// Shape of a property value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ValueKind {
    /// Boolean
    Bool,
    /// Integer
    Int,
    /// String
    Str,
    /// Enumeration
    Enum(EnumInfo),
    /// Any other object type
    Object {
        /// Object type name
        type_name: TypeRef,
    },
}

impl ValueKind {
    /// The parameter type this kind presents in a signature
    #[must_use]
    pub fn type_ref(&self) -> TypeRef {
        match self {
            Self::Bool => TypeRef::new(TypeRef::BOOLEAN),
            Self::Int => TypeRef::new(TypeRef::INT32),
            Self::Str => TypeRef::new(TypeRef::STRING),
            Self::Enum(info) => info.name.clone(),
            Self::Object { type_name } => type_name.clone(),
        }
    }

    /// Default value of this kind: `false`, `0`, null for reference types,
    /// the first declared member for enumerations.
    #[must_use]
    pub fn default_value(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::Str => Value::Null,
            Self::Enum(info) => Value::Enum(info.members.first().map_or(0, |m| m.value)),
            Self::Object { type_name } => Value::Object(type_name.clone()),
        }
    }

    /// Boolean, string and non-flag enumeration kinds get generated probes
    #[must_use]
    pub fn is_auto_testable(&self) -> bool {
        match self {
            Self::Bool | Self::Str => true,
            Self::Enum(info) => !info.flags,
            Self::Int | Self::Object { .. } => false,
        }
    }

    /// Resolve a primitive type name to its kind
    #[must_use]
    pub fn from_primitive(ty: &TypeRef) -> Option<Self> {
        match ty.short_name() {
            "Boolean" | "bool" => Some(Self::Bool),
            "Byte" | "SByte" | "Int16" | "UInt16" | "Int32" | "UInt32" | "Int64" | "UInt64"
            | "i32" | "i64" | "u32" | "u64" => Some(Self::Int),
            "String" | "string" => Some(Self::Str),
            _ => None,
        }
    }
}

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible to callers; expected to have a scenario
    #[default]
    Public,
    /// Visible to subclasses only (e.g. `On<Event>` triggers)
    Protected,
}

/// What kind of member an operation stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Plain method
    #[default]
    Method,
    /// Property (covers both accessors)
    Property,
    /// Event
    Event,
}

/// Metadata for one member of the API under test
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Member name, possibly qualified (`IFoo.Bar`)
    pub name: String,
    /// Type that introduces this member
    pub declaring_type: TypeRef,
    /// Ordered parameter types
    #[serde(default)]
    pub parameter_types: Vec<TypeRef>,
    /// Static member
    #[serde(default)]
    pub is_static: bool,
    /// Member kind
    #[serde(default)]
    pub kind: OperationKind,
    /// Visibility
    #[serde(default)]
    pub visibility: Visibility,
}

impl OperationDescriptor {
    /// Public instance method
    #[must_use]
    pub fn method<I, T>(name: impl Into<String>, declaring_type: impl Into<TypeRef>, params: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeRef>,
    {
        Self {
            name: name.into(),
            declaring_type: declaring_type.into(),
            parameter_types: params.into_iter().map(Into::into).collect(),
            is_static: false,
            kind: OperationKind::Method,
            visibility: Visibility::Public,
        }
    }

    /// Property member
    #[must_use]
    pub fn property(name: impl Into<String>, declaring_type: impl Into<TypeRef>) -> Self {
        Self {
            kind: OperationKind::Property,
            ..Self::method(name, declaring_type, Vec::<TypeRef>::new())
        }
    }

    /// Event member
    #[must_use]
    pub fn event(name: impl Into<String>, declaring_type: impl Into<TypeRef>) -> Self {
        Self {
            kind: OperationKind::Event,
            ..Self::method(name, declaring_type, Vec::<TypeRef>::new())
        }
    }

    /// Name after the last qualifying separator
    #[must_use]
    pub fn member_name(&self) -> &str {
        member_name_of(&self.name)
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

    /// Event add/remove and ShouldSerialize members
    #[must_use]
    pub fn is_plumbing(&self) -> bool {
        let name = self.member_name();
        PLUMBING_PREFIXES.iter().any(|p| name.starts_with(p))
    }

    /// Same member name and parameter list (declaring type ignored)
    #[must_use]
    pub fn same_member(&self, other: &Self) -> bool {
        self.member_name() == other.member_name() && self.parameter_types == other.parameter_types
    }
}

/// Format `name(P1, P2)` from parts
#[must_use]
pub fn format_signature(name: &str, params: &[TypeRef]) -> String {
    let params: Vec<&str> = params.iter().map(TypeRef::as_str).collect();
    format!("{name}({})", params.join(", "))
}

/// Metadata for one property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Property name
    pub name: String,
    /// Type that introduces this property
    pub declaring_type: TypeRef,
    /// Value shape
    pub value_kind: ValueKind,
    /// Has a public getter
    pub readable: bool,
    /// Has a public setter
    pub writable: bool,
}

impl PropertyDescriptor {
    /// The operation this property surfaces as
    #[must_use]
    pub fn as_operation(&self) -> OperationDescriptor {
        OperationDescriptor::property(self.name.clone(), self.declaring_type.clone())
    }

    /// Read/write property of a generated-probe kind
    #[must_use]
    pub fn is_auto_testable(&self) -> bool {
        self.readable && self.writable && self.value_kind.is_auto_testable()
    }

    /// Accessor name used with [`crate::Target::invoke`] to read the value
    #[must_use]
    pub fn getter(&self) -> String {
        format!("get_{}", self.name)
    }

    /// Accessor name used with [`crate::Target::invoke`] to write the value
    #[must_use]
    pub fn setter(&self) -> String {
        format!("set_{}", self.name)
    }
}

/// Metadata for one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDescriptor {
    /// Event name
    pub name: String,
    /// Type that introduces this event
    pub declaring_type: TypeRef,
    /// Type of the event-argument payload
    pub argument_type: TypeRef,
}

impl EventDescriptor {
    /// The operation this event surfaces as
    #[must_use]
    pub fn as_operation(&self) -> OperationDescriptor {
        OperationDescriptor::event(self.name.clone(), self.declaring_type.clone())
    }

    /// Name of the target's own trigger method (`OnClick`)
    #[must_use]
    pub fn trigger_name(&self) -> String {
        format!("On{}", self.name)
    }

    /// Name of a test-author raise hook (`RaiseClick`)
    #[must_use]
    pub fn raise_hook_name(&self) -> String {
        format!("Raise{}", self.name)
    }
}
