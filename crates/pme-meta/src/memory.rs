//! In-memory live target
//!
//! Realizes a registry type as an object the probes can drive: properties hold
//! values, declared methods succeed, and `On<Event>` triggers fire subscribed
//! handlers.

use crate::error::Result;
use crate::metadata::{
    EventArgs, EventHandler, ObjectId, ProbeFailure, SubscriptionToken, Target, TypeMetadata,
};
use crate::types::{OperationKind, PropertyDescriptor, TypeRef, Value, ValueKind};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
struct Slot {
    descriptor: PropertyDescriptor,
    value: Value,
}

/// A registry type realized as a live object
pub struct InMemoryTarget {
    id: ObjectId,
    ty: TypeRef,
    properties: BTreeMap<String, Slot>,
    methods: BTreeSet<String>,
    events: BTreeSet<String>,
    handlers: Vec<(SubscriptionToken, EventHandler)>,
    next_token: u64,
    failures: BTreeMap<String, ProbeFailure>,
    repeats: BTreeMap<String, usize>,
    realizing: BTreeSet<String>,
    realized: bool,
    calls: Vec<String>,
}

impl std::fmt::Debug for InMemoryTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTarget")
            .field("id", &self.id)
            .field("ty", &self.ty)
            .field("properties", &self.properties.len())
            .field("handlers", &self.handlers.len())
            .field("realized", &self.realized)
            .finish_non_exhaustive()
    }
}

impl InMemoryTarget {
    /// Realize `ty` from its metadata
    ///
    /// # Errors
    ///
    /// Returns an error if `ty` is unknown to `meta`.
    pub fn from_metadata(meta: &dyn TypeMetadata, ty: &TypeRef) -> Result<Self> {
        let properties = meta
            .list_public_properties(ty)?
            .into_iter()
            .map(|descriptor| {
                let value = match descriptor.value_kind {
                    ValueKind::Str => Value::Str(String::new()),
                    ref kind => kind.default_value(),
                };
                (descriptor.name.clone(), Slot { descriptor, value })
            })
            .collect();
        let methods = meta
            .list_public_operations(ty)?
            .into_iter()
            .filter(|op| op.kind == OperationKind::Method)
            .map(|op| op.member_name().to_string())
            .collect();
        let events = meta
            .list_public_events(ty)?
            .into_iter()
            .map(|e| e.name)
            .collect();

        Ok(Self {
            id: ObjectId(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)),
            ty: ty.clone(),
            properties,
            methods,
            events,
            handlers: Vec::new(),
            next_token: 1,
            failures: BTreeMap::new(),
            repeats: BTreeMap::new(),
            realizing: BTreeSet::new(),
            realized: false,
            calls: Vec::new(),
        })
    }

    /// Both accessors of `property` raise a permission denial
    #[must_use]
    pub fn deny_property(mut self, property: &str) -> Self {
        let denial = ProbeFailure::PermissionDenied(format!("{property} requires elevated permission"));
        self.failures.insert(format!("get_{property}"), denial.clone());
        self.failures.insert(format!("set_{property}"), denial);
        self
    }

    /// Invoking `operation` raises `failure`
    #[must_use]
    pub fn fail_on(mut self, operation: &str, failure: ProbeFailure) -> Self {
        self.failures.insert(operation.to_string(), failure);
        self
    }

    /// Each trigger of `event` fires handlers `times` times
    #[must_use]
    pub fn repeat_event(mut self, event: &str, times: usize) -> Self {
        self.repeats.insert(event.to_string(), times);
        self
    }

    /// Invoking `operation` realizes the heavyweight resource
    #[must_use]
    pub fn realizes_on(mut self, operation: &str) -> Self {
        self.realizing.insert(operation.to_string());
        self
    }

    /// Current value of a property, bypassing accessors
    #[must_use]
    pub fn property_value(&self, property: &str) -> Option<&Value> {
        self.properties.get(property).map(|slot| &slot.value)
    }

    /// Every operation invoked so far, in order
    #[must_use]
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Handlers currently attached
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }

    fn get(&self, property: &str) -> std::result::Result<Value, ProbeFailure> {
        let slot = self
            .properties
            .get(property)
            .filter(|slot| slot.descriptor.readable)
            .ok_or_else(|| ProbeFailure::MissingMember(format!("get_{property}")))?;
        Ok(slot.value.clone())
    }

    fn set(&mut self, property: &str, args: &[Value]) -> std::result::Result<Value, ProbeFailure> {
        let slot = self
            .properties
            .get_mut(property)
            .filter(|slot| slot.descriptor.writable)
            .ok_or_else(|| ProbeFailure::MissingMember(format!("set_{property}")))?;
        let value = args
            .first()
            .cloned()
            .ok_or_else(|| ProbeFailure::InvalidArgument(format!("set_{property} expects a value")))?;
        slot.value = coerce(&slot.descriptor.value_kind, property, value)?;
        Ok(Value::Null)
    }

    fn fire(&mut self, event: &str, args: &[Value]) {
        let payload = args.first().cloned().unwrap_or(Value::Null);
        let event_args = EventArgs {
            sender: self.id,
            event: event.to_string(),
            payload,
        };
        let times = self.repeats.get(event).copied().unwrap_or(1);
        for _ in 0..times {
            for (token, handler) in &mut self.handlers {
                if token.event == event {
                    handler(&event_args);
                }
            }
        }
    }
}

/// Validate and normalize a value written to a property of `kind`
fn coerce(kind: &ValueKind, property: &str, value: Value) -> std::result::Result<Value, ProbeFailure> {
    match (kind, value) {
        (ValueKind::Str, Value::Null) => Ok(Value::Str(String::new())),
        (ValueKind::Str, v @ Value::Str(_))
        | (ValueKind::Bool, v @ Value::Bool(_))
        | (ValueKind::Int, v @ Value::Int(_)) => Ok(v),
        (ValueKind::Enum(info), Value::Enum(raw) | Value::Int(raw)) => {
            if info.flags || info.contains(raw) {
                Ok(Value::Enum(raw))
            } else {
                Err(ProbeFailure::InvalidArgument(format!(
                    "{raw} is not a declared {} value for {property}",
                    info.name
                )))
            }
        }
        (ValueKind::Object { .. }, v) => Ok(v),
        (kind, v) => Err(ProbeFailure::InvalidArgument(format!(
            "{v} is not a valid {} for {property}",
            kind.type_ref()
        ))),
    }
}

impl Target for InMemoryTarget {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn type_ref(&self) -> TypeRef {
        self.ty.clone()
    }

    fn invoke(&mut self, operation: &str, args: &[Value]) -> std::result::Result<Value, ProbeFailure> {
        self.calls.push(operation.to_string());
        if let Some(failure) = self.failures.get(operation) {
            return Err(failure.clone());
        }
        if self.realizing.contains(operation) {
            self.realized = true;
        }

        if let Some(property) = operation.strip_prefix("get_") {
            if self.properties.contains_key(property) {
                return self.get(property);
            }
        }
        if let Some(property) = operation.strip_prefix("set_") {
            if self.properties.contains_key(property) {
                return self.set(property, args);
            }
        }
        if let Some(event) = operation.strip_prefix("On") {
            if self.events.contains(event) {
                self.fire(event, args);
                return Ok(Value::Null);
            }
        }
        if self.methods.contains(operation) || self.realizing.contains(operation) {
            return Ok(Value::Null);
        }
        Err(ProbeFailure::MissingMember(format!("{}.{operation}", self.ty)))
    }

    fn subscribe(
        &mut self,
        event: &str,
        handler: EventHandler,
    ) -> std::result::Result<SubscriptionToken, ProbeFailure> {
        if !self.events.contains(event) {
            return Err(ProbeFailure::MissingMember(format!("{}.{event}", self.ty)));
        }
        let token = SubscriptionToken {
            id: self.next_token,
            event: event.to_string(),
        };
        self.next_token += 1;
        self.handlers.push((token.clone(), handler));
        Ok(token)
    }

    fn unsubscribe(&mut self, token: SubscriptionToken) -> std::result::Result<(), ProbeFailure> {
        let before = self.handlers.len();
        self.handlers.retain(|(t, _)| *t != token);
        if self.handlers.len() == before {
            return Err(ProbeFailure::Other(format!(
                "no subscription {} on {}",
                token.id, token.event
            )));
        }
        Ok(())
    }

    fn is_realized(&self) -> bool {
        self.realized
    }
}
