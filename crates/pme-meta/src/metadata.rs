//! Type metadata accessor and live-target contracts
//!
//! The engine depends only on these two traits. [`TypeMetadata`] answers
//! questions about types; [`Target`] is a live instance that probes invoke
//! members on and subscribe to.

use crate::error::Result;
use crate::types::{EventDescriptor, OperationDescriptor, PropertyDescriptor, TypeRef, Value, ValueKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure raised by a target while a probe exercises it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeFailure {
    /// Argument validation rejected the input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Caller lacks the permission the member demands
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Member does not exist on the target
    #[error("Missing member: {0}")]
    MissingMember(String),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

impl ProbeFailure {
    /// Argument-validation failure
    #[must_use]
    pub const fn is_argument_validation(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Permission/security denial
    #[must_use]
    pub const fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }
}

/// Identity of a live target object, used to check event senders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Payload delivered to an event handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventArgs {
    /// Object that raised the event
    pub sender: ObjectId,
    /// Event name
    pub event: String,
    /// Event-argument payload
    pub payload: Value,
}

/// Callback registered with [`Target::subscribe`]
pub type EventHandler = Box<dyn FnMut(&EventArgs)>;

/// Handle returned by [`Target::subscribe`]; pass it back to unsubscribe
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionToken {
    /// Token id, unique per target
    pub id: u64,
    /// Event the handler is attached to
    pub event: String,
}

/// Read-only view of the API under test.
///
/// Implementations bridge to whatever describes the real types: a manifest,
/// generated code, or a reflective runtime.
pub trait TypeMetadata {
    /// Public members of `ty` and its ancestors, each tagged with its declaring type
    ///
    /// # Errors
    ///
    /// Returns an error if `ty` is unknown.
    fn list_public_operations(&self, ty: &TypeRef) -> Result<Vec<OperationDescriptor>>;

    /// Public properties of `ty` and its ancestors
    ///
    /// # Errors
    ///
    /// Returns an error if `ty` is unknown.
    fn list_public_properties(&self, ty: &TypeRef) -> Result<Vec<PropertyDescriptor>>;

    /// Public events of `ty` and its ancestors
    ///
    /// # Errors
    ///
    /// Returns an error if `ty` is unknown.
    fn list_public_events(&self, ty: &TypeRef) -> Result<Vec<EventDescriptor>>;

    /// Direct ancestor of `ty`, `None` at the root or for unknown types
    fn ancestor(&self, ty: &TypeRef) -> Option<TypeRef>;

    /// Find a member of any visibility by name, searching up the ancestor chain
    fn find_operation(&self, ty: &TypeRef, name: &str) -> Option<OperationDescriptor>;

    /// Resolve a type name to a value kind (primitives and known enumerations)
    fn value_kind(&self, ty: &TypeRef) -> Option<ValueKind> {
        ValueKind::from_primitive(ty)
    }

    /// `ty` followed by each ancestor up to the root
    fn ancestry(&self, ty: &TypeRef) -> Vec<TypeRef> {
        let mut chain = vec![ty.clone()];
        let mut current = self.ancestor(ty);
        while let Some(next) = current {
            if chain.contains(&next) {
                break;
            }
            current = self.ancestor(&next);
            chain.push(next);
        }
        chain
    }

    /// Default-constructed value for a parameter of type `ty`
    fn default_value(&self, ty: &TypeRef) -> Value {
        self.value_kind(ty)
            .map_or_else(|| Value::Object(ty.clone()), |kind| kind.default_value())
    }
}

/// A live object the probes run against
pub trait Target {
    /// Identity used as the event sender
    fn object_id(&self) -> ObjectId;

    /// Runtime type of this object
    fn type_ref(&self) -> TypeRef;

    /// Invoke a member by name. Property accessors are `get_<Name>` and
    /// `set_<Name>`.
    ///
    /// # Errors
    ///
    /// Returns the failure the member raised.
    fn invoke(&mut self, operation: &str, args: &[Value]) -> std::result::Result<Value, ProbeFailure>;

    /// Attach a handler to an event
    ///
    /// # Errors
    ///
    /// Returns an error if the event does not exist or cannot be subscribed.
    fn subscribe(
        &mut self,
        event: &str,
        handler: EventHandler,
    ) -> std::result::Result<SubscriptionToken, ProbeFailure>;

    /// Detach a handler previously attached with [`Target::subscribe`]
    ///
    /// # Errors
    ///
    /// Returns an error if the token is unknown.
    fn unsubscribe(&mut self, token: SubscriptionToken) -> std::result::Result<(), ProbeFailure>;

    /// Whether the heavyweight underlying resource has been realized
    fn is_realized(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Chain;

    impl TypeMetadata for Chain {
        fn list_public_operations(&self, _ty: &TypeRef) -> Result<Vec<OperationDescriptor>> {
            Ok(Vec::new())
        }
        fn list_public_properties(&self, _ty: &TypeRef) -> Result<Vec<PropertyDescriptor>> {
            Ok(Vec::new())
        }
        fn list_public_events(&self, _ty: &TypeRef) -> Result<Vec<EventDescriptor>> {
            Ok(Vec::new())
        }
        fn ancestor(&self, ty: &TypeRef) -> Option<TypeRef> {
            match ty.as_str() {
                "Button" => Some(TypeRef::new("Control")),
                "Control" => Some(TypeRef::new("Component")),
                // deliberately cyclic
                "Loop" => Some(TypeRef::new("Loop")),
                _ => None,
            }
        }
        fn find_operation(&self, _ty: &TypeRef, _name: &str) -> Option<OperationDescriptor> {
            None
        }
    }

    #[test]
    fn test_ancestry_walks_to_root() {
        let chain = Chain.ancestry(&TypeRef::new("Button"));
        let names: Vec<&str> = chain.iter().map(TypeRef::as_str).collect();
        assert_eq!(names, vec!["Button", "Control", "Component"]);
    }

    #[test]
    fn test_ancestry_stops_on_cycle() {
        assert_eq!(Chain.ancestry(&TypeRef::new("Loop")).len(), 1);
    }

    #[test]
    fn test_default_values_for_parameters() {
        assert_eq!(Chain.default_value(&TypeRef::new("Boolean")), Value::Bool(false));
        assert_eq!(Chain.default_value(&TypeRef::new("Int32")), Value::Int(0));
        assert_eq!(Chain.default_value(&TypeRef::new("String")), Value::Null);
        assert_eq!(
            Chain.default_value(&TypeRef::new("PaintEventArgs")),
            Value::Object(TypeRef::new("PaintEventArgs"))
        );
    }

    #[test]
    fn test_probe_failure_classification() {
        assert!(ProbeFailure::InvalidArgument("x".into()).is_argument_validation());
        assert!(ProbeFailure::PermissionDenied("x".into()).is_permission_denied());
        assert!(!ProbeFailure::Other("x".into()).is_argument_validation());
    }
}
