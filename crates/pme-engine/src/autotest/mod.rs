//! Auto-test generator
//!
//! Synthesizes scenarios for simple-shaped properties (boolean, non-flag
//! enumeration, string) and for events, so no hand-written probe is needed
//! for them. Generated scenarios are grouped, matched and accounted exactly
//! like hand-written ones.

pub mod event;
pub mod property;

pub use event::{DOUBLE_FIRING_EVENT, EventTrigger, probe_event};
pub use property::probe_property;

use crate::error::{Error, Result};
use crate::grouping::HierarchyLevel;
use crate::matcher;
use crate::policy::RunPolicies;
use crate::scenario::{ScenarioRegistry, ScenarioResult};
use pme_meta::{
    EventDescriptor, OperationDescriptor, PropertyDescriptor, ScenarioDescriptor, Target,
    TypeMetadata, TypeRef,
};
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

/// Body of a generated scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoProbe {
    /// Write/read-back probe of a property
    Property(PropertyDescriptor),
    /// Subscribe/fire probe of an event
    Event {
        /// Event under test
        event: EventDescriptor,
        /// How to fire it
        trigger: EventTrigger,
    },
}

impl AutoProbe {
    /// Member the probe exercises
    #[must_use]
    pub fn member_name(&self) -> &str {
        match self {
            Self::Property(p) => &p.name,
            Self::Event { event, .. } => &event.name,
        }
    }

    /// Run against `target`
    pub fn run(
        &self,
        target: &mut dyn Target,
        meta: &dyn TypeMetadata,
        rng: &mut StdRng,
        policies: &RunPolicies,
        scenarios: &mut ScenarioRegistry,
    ) -> ScenarioResult {
        match self {
            Self::Property(p) => probe_property(target, p, rng, policies),
            Self::Event { event, trigger } => probe_event(target, event, trigger, meta, scenarios),
        }
    }
}

/// A generated scenario: descriptor plus probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedScenario {
    /// Descriptor, marked `generated`
    pub descriptor: ScenarioDescriptor,
    /// Probe body
    pub probe: AutoProbe,
}

/// Introspects a target type and synthesizes probes
pub struct AutoTestGenerator<'a> {
    meta: &'a dyn TypeMetadata,
    policies: &'a RunPolicies,
}

impl<'a> AutoTestGenerator<'a> {
    /// Generator honoring `policies`
    #[must_use]
    pub fn new(meta: &'a dyn TypeMetadata, policies: &'a RunPolicies) -> Self {
        Self { meta, policies }
    }

    /// Generate probes for the properties and events of `target`.
    ///
    /// Members covered by a hand-written scenario are skipped unless running
    /// in auto-test-only mode. Each generated scenario is declared at the
    /// suite level paired with the member's declaring type, falling back to
    /// the most-derived suite level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingEventTrigger`] for an event that cannot be fired
    /// and is neither excluded nor tolerated by policy.
    pub fn generate(
        &self,
        target: &TypeRef,
        levels: &[HierarchyLevel],
        hand_written: &[ScenarioDescriptor],
        scenarios: &ScenarioRegistry,
    ) -> Result<Vec<GeneratedScenario>> {
        let Some(most_derived) = levels.first() else {
            return Ok(Vec::new());
        };
        let suite_for = |declaring: &TypeRef| -> TypeRef {
            levels
                .iter()
                .find(|l| l.target_type.as_ref() == Some(declaring))
                .unwrap_or(most_derived)
                .suite_type
                .clone()
        };
        let covered = |op: &OperationDescriptor| !self.policies.auto_test_only && matcher::is_covered(op, hand_written);
        let exclusions = &self.policies.exclusions;
        let mut generated = Vec::new();

        for property in self.meta.list_public_properties(target)? {
            if exclusions.is_property_excluded(&property.name) {
                info!(property = %property.name, "skipping excluded property");
                continue;
            }
            if !property.is_auto_testable() {
                debug!(property = %property.name, "property shape has no generated probe");
                continue;
            }
            if covered(&property.as_operation()) {
                debug!(property = %property.name, "property has a hand-written scenario");
                continue;
            }
            let descriptor = ScenarioDescriptor::builder(&property.name, suite_for(&property.declaring_type))
                .property()
                .description(format!(
                    "generated {} property probe",
                    property.value_kind.type_ref()
                ))
                .generated()
                .build();
            generated.push(GeneratedScenario {
                descriptor,
                probe: AutoProbe::Property(property),
            });
        }

        for event in self.meta.list_public_events(target)? {
            if exclusions.is_event_excluded(&event.name) {
                info!(event = %event.name, "skipping excluded event");
                continue;
            }
            if covered(&event.as_operation()) {
                debug!(event = %event.name, "event has a hand-written scenario");
                continue;
            }
            let trigger = EventTrigger::resolve(&event, target, self.meta, scenarios);
            if trigger == EventTrigger::Missing {
                if !self.policies.tolerate_missing_event_trigger {
                    return Err(Error::MissingEventTrigger {
                        event: event.name,
                        target: target.to_string(),
                    });
                }
                warn!(event = %event.name, "no trigger for event, tolerated by policy");
            }
            let descriptor = ScenarioDescriptor::builder(&event.name, suite_for(&event.declaring_type))
                .event()
                .description("generated event probe")
                .generated()
                .build();
            generated.push(GeneratedScenario {
                descriptor,
                probe: AutoProbe::Event { event, trigger },
            });
        }

        info!(target = %target, count = generated.len(), "generated auto-test scenarios");
        Ok(generated)
    }
}
