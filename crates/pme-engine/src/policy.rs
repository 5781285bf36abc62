//! Run policies and the auto-test exclusion set

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Property and event names the auto-test generator skips.
///
/// Excluded members are also dropped from the expected operations, so they
/// are never reported missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionSet {
    /// Excluded property names
    #[serde(default)]
    pub excluded_properties: BTreeSet<String>,
    /// Excluded event names
    #[serde(default)]
    pub excluded_events: BTreeSet<String>,
}

impl ExclusionSet {
    /// Empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude a property
    #[must_use]
    pub fn exclude_property(mut self, name: impl Into<String>) -> Self {
        self.excluded_properties.insert(name.into());
        self
    }

    /// Exclude an event
    #[must_use]
    pub fn exclude_event(mut self, name: impl Into<String>) -> Self {
        self.excluded_events.insert(name.into());
        self
    }

    /// Whether `name` is an excluded property
    #[must_use]
    pub fn is_property_excluded(&self, name: &str) -> bool {
        self.excluded_properties.contains(name)
    }

    /// Whether `name` is an excluded event
    #[must_use]
    pub fn is_event_excluded(&self, name: &str) -> bool {
        self.excluded_events.contains(name)
    }

    /// No exclusions configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.excluded_properties.is_empty() && self.excluded_events.is_empty()
    }
}

/// Options controlling one conformance run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunPolicies {
    /// Missing operations do not count as failures
    pub ignore_missing: bool,
    /// Run generated probes only; hand-written scenarios and missing accounting are skipped
    pub auto_test_only: bool,
    /// Stop after the first group with a failure
    pub stop_on_group_failure: bool,
    /// Stop after the first failing scenario
    pub stop_on_scenario_failure: bool,
    /// Only run scenarios safe before the target's heavyweight resource is realized
    pub pre_handle_mode: bool,
    /// Exclude every scenario of the ancestor-level groups
    pub exclude_ancestors: bool,
    /// Skip the out-of-range enumeration probes
    pub no_enum_bounds_test: bool,
    /// An event without a trigger is tolerated instead of aborting the run
    pub tolerate_missing_event_trigger: bool,
    /// Generate probes for simple properties and events
    pub auto_test: bool,
    /// Name scenarios by qualified signature in outcomes
    pub full_names: bool,
    /// Seed for every random probe value; a fresh seed is drawn when unset
    pub seed: Option<u64>,
    /// Members the generator skips
    #[serde(flatten)]
    pub exclusions: ExclusionSet,
}

impl Default for RunPolicies {
    fn default() -> Self {
        Self {
            ignore_missing: false,
            auto_test_only: false,
            stop_on_group_failure: false,
            stop_on_scenario_failure: false,
            pre_handle_mode: false,
            exclude_ancestors: false,
            no_enum_bounds_test: false,
            tolerate_missing_event_trigger: false,
            auto_test: true,
            full_names: false,
            seed: None,
            exclusions: ExclusionSet::default(),
        }
    }
}

impl RunPolicies {
    /// Load policies from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse policies from YAML
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or the policies contradict each other.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let policies: Self = serde_yaml::from_str(yaml).map_err(Error::from)?;
        policies.validate()?;
        Ok(policies)
    }

    /// Convert to YAML
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(Error::from)
    }

    /// Reject contradictory combinations
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when auto-test-only mode is requested
    /// with the generator disabled.
    pub fn validate(&self) -> Result<()> {
        if self.auto_test_only && !self.auto_test {
            return Err(Error::Configuration(
                "auto_test_only requires auto_test".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether the generator runs
    #[must_use]
    pub fn generates_probes(&self) -> bool {
        self.auto_test || self.auto_test_only
    }

    /// Whether missing operations count against the run
    #[must_use]
    pub fn counts_missing(&self) -> bool {
        !self.ignore_missing && !self.auto_test_only
    }

    /// Use a fixed seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the exclusion set
    #[must_use]
    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Turn pre-handle mode on or off
    #[must_use]
    pub fn with_pre_handle_mode(mut self, enabled: bool) -> Self {
        self.pre_handle_mode = enabled;
        self
    }
}
