//! PME Metadata
//!
//! Type metadata model for the properties/methods/events (PME) conformance harness.
//! The engine never reflects over live code: every type it reasons about is
//! described by a [`TypeRef`] resolved through a [`TypeMetadata`] accessor,
//! usually a manifest-backed [`TypeRegistry`].
//!
//! # Overview
//!
//! - [`OperationDescriptor`]: one public member of the API under test
//! - [`ScenarioDescriptor`]: one probe written (or generated) to exercise a member
//! - [`Target`]: a live object the probes run against
//! - [`InMemoryTarget`]: a registry type realized as a live object

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// Allow common patterns
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::module_name_repetitions)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::redundant_clone))]

pub mod error;
pub mod memory;
pub mod metadata;
pub mod proptest_impl;
pub mod registry;
pub mod scenario;
pub mod types;

pub use error::{Error, Result};
pub use memory::InMemoryTarget;
pub use metadata::{
    EventArgs, EventHandler, ObjectId, ProbeFailure, SubscriptionToken, Target, TypeMetadata,
};
pub use registry::{
    EventSpec, MethodSpec, PropertySpec, RegistryManifest, TypeDefinition, TypeRegistry,
};
pub use scenario::{ExecutionMode, ScenarioBuilder, ScenarioDescriptor, ScenarioKind};
pub use types::{
    EnumInfo, EnumMember, EventDescriptor, OperationDescriptor, OperationKind,
    PropertyDescriptor, TypeRef, Value, ValueKind, Visibility,
};
