//! Runnable scenarios and the scenario registry
//!
//! A [`Scenario`] pairs a descriptor with the probe body the test author
//! wrote. The registry also holds raise hooks: author-supplied ways to fire
//! an event, keyed `Raise<Event>`.

use pme_meta::{ProbeFailure, ScenarioDescriptor, Target, TypeMetadata, Value};
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use thiserror::Error;

/// Checks recorded by one probe run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioResult {
    failures: Vec<String>,
    notes: Vec<String>,
    tolerated: bool,
}

impl ScenarioResult {
    /// Empty, passing result
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Passing result
    #[must_use]
    pub fn pass() -> Self {
        Self::default()
    }

    /// Result with a single failure
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        let mut result = Self::default();
        result.fail(message);
        result
    }

    /// Record a failure
    pub fn fail(&mut self, message: impl Into<String>) {
        self.failures.push(message.into());
    }

    /// Record a failure unless `condition` holds; returns `condition`
    pub fn check(&mut self, condition: bool, message: impl Into<String>) -> bool {
        if !condition {
            self.fail(message);
        }
        condition
    }

    /// Record an informational note
    pub fn note(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }

    /// Record a permission denial that stops the probe without failing it
    pub fn tolerate(&mut self, message: impl Into<String>) {
        self.tolerated = true;
        self.notes.push(message.into());
    }

    /// No failures recorded
    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.failures.is_empty()
    }

    /// A permission denial was tolerated
    #[must_use]
    pub fn is_tolerated(&self) -> bool {
        self.tolerated
    }

    /// Failure messages
    #[must_use]
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Notes
    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Split into `(failures, notes)`
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.failures, self.notes)
    }
}

/// Failure escaping a probe body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    /// The target raised a failure the probe did not handle
    #[error(transparent)]
    Probe(#[from] ProbeFailure),

    /// The probe gave up
    #[error("Scenario aborted: {0}")]
    Aborted(String),
}

impl ScenarioError {
    /// Permission denial from the target
    #[must_use]
    pub const fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Probe(ProbeFailure::PermissionDenied(_)))
    }

    /// Argument-validation failure from the target
    #[must_use]
    pub const fn is_argument_validation(&self) -> bool {
        matches!(self, Self::Probe(ProbeFailure::InvalidArgument(_)))
    }
}

/// Everything a probe body can reach while it runs
pub struct ScenarioContext<'a> {
    /// Live object under test
    pub target: &'a mut dyn Target,
    /// Metadata for the API under test
    pub meta: &'a dyn TypeMetadata,
    /// Seeded source of random probe values
    pub rng: &'a mut StdRng,
    /// Synthesized probe arguments, one per declared probe parameter
    pub args: Vec<Value>,
    /// The scenario being run
    pub descriptor: &'a ScenarioDescriptor,
}

impl ScenarioContext<'_> {
    /// Invoke a member on the target
    ///
    /// # Errors
    ///
    /// Returns the failure the target raised.
    pub fn invoke(&mut self, operation: &str, args: &[Value]) -> Result<Value, ProbeFailure> {
        self.target.invoke(operation, args)
    }

    /// Read a property through its getter
    ///
    /// # Errors
    ///
    /// Returns the failure the target raised.
    pub fn get(&mut self, property: &str) -> Result<Value, ProbeFailure> {
        self.target.invoke(&format!("get_{property}"), &[])
    }

    /// Write a property through its setter
    ///
    /// # Errors
    ///
    /// Returns the failure the target raised.
    pub fn set(&mut self, property: &str, value: Value) -> Result<(), ProbeFailure> {
        self.target.invoke(&format!("set_{property}"), &[value]).map(|_| ())
    }
}

/// Probe body
pub type ScenarioFn =
    Box<dyn FnMut(&mut ScenarioContext<'_>) -> Result<ScenarioResult, ScenarioError>>;

/// Author-supplied way to fire an event on a target
pub type RaiseHook = Box<dyn FnMut(&mut dyn Target) -> Result<(), ProbeFailure>>;

/// A hand-written scenario
pub struct Scenario {
    descriptor: ScenarioDescriptor,
    body: ScenarioFn,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    /// Pair a descriptor with its body
    #[must_use]
    pub fn new<F>(descriptor: ScenarioDescriptor, body: F) -> Self
    where
        F: FnMut(&mut ScenarioContext<'_>) -> Result<ScenarioResult, ScenarioError> + 'static,
    {
        Self {
            descriptor,
            body: Box::new(body),
        }
    }

    /// Descriptor
    #[must_use]
    pub fn descriptor(&self) -> &ScenarioDescriptor {
        &self.descriptor
    }

    /// Run the body
    ///
    /// # Errors
    ///
    /// Returns whatever the body returns.
    pub fn run(&mut self, ctx: &mut ScenarioContext<'_>) -> Result<ScenarioResult, ScenarioError> {
        (self.body)(ctx)
    }
}

/// The scenarios and raise hooks of one test suite
#[derive(Default)]
pub struct ScenarioRegistry {
    scenarios: Vec<Scenario>,
    raise_hooks: BTreeMap<String, RaiseHook>,
}

impl std::fmt::Debug for ScenarioRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioRegistry")
            .field("scenarios", &self.scenarios)
            .field("raise_hooks", &self.raise_hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ScenarioRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scenario
    pub fn register<F>(&mut self, descriptor: ScenarioDescriptor, body: F) -> &mut Self
    where
        F: FnMut(&mut ScenarioContext<'_>) -> Result<ScenarioResult, ScenarioError> + 'static,
    {
        self.scenarios.push(Scenario::new(descriptor, body));
        self
    }

    /// Add a scenario, builder style
    #[must_use]
    pub fn with_scenario<F>(mut self, descriptor: ScenarioDescriptor, body: F) -> Self
    where
        F: FnMut(&mut ScenarioContext<'_>) -> Result<ScenarioResult, ScenarioError> + 'static,
    {
        self.register(descriptor, body);
        self
    }

    /// Add a raise hook for `event` (stored as `Raise<event>`)
    pub fn register_raise_hook<F>(&mut self, event: &str, hook: F) -> &mut Self
    where
        F: FnMut(&mut dyn Target) -> Result<(), ProbeFailure> + 'static,
    {
        self.raise_hooks.insert(format!("Raise{event}"), Box::new(hook));
        self
    }

    /// Add a raise hook, builder style
    #[must_use]
    pub fn with_raise_hook<F>(mut self, event: &str, hook: F) -> Self
    where
        F: FnMut(&mut dyn Target) -> Result<(), ProbeFailure> + 'static,
    {
        self.register_raise_hook(event, hook);
        self
    }

    /// Whether a hook named `name` (e.g. `RaiseClick`) exists
    #[must_use]
    pub fn has_raise_hook(&self, name: &str) -> bool {
        self.raise_hooks.contains_key(name)
    }

    /// Mutable access to a hook by name
    pub fn raise_hook_mut(&mut self, name: &str) -> Option<&mut RaiseHook> {
        self.raise_hooks.get_mut(name)
    }

    /// Descriptors in registration order
    #[must_use]
    pub fn descriptors(&self) -> Vec<ScenarioDescriptor> {
        self.scenarios.iter().map(|s| s.descriptor.clone()).collect()
    }

    /// Scenario at `index`
    pub fn scenario_mut(&mut self, index: usize) -> Option<&mut Scenario> {
        self.scenarios.get_mut(index)
    }

    /// Number of scenarios
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// No scenarios registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pme_meta::{InMemoryTarget, TypeDefinition, TypeRef, TypeRegistry, ValueKind};
    use rand::SeedableRng;

    fn registry() -> TypeRegistry {
        TypeRegistry::new().with_type(TypeDefinition::new("Widget").property("Name", ValueKind::Str))
    }

    #[test]
    fn test_result_checks() {
        let mut r = ScenarioResult::new();
        assert!(r.check(true, "fine"));
        assert!(r.is_pass());
        assert!(!r.check(false, "broken"));
        assert!(!r.is_pass());
        assert_eq!(r.failures(), &["broken".to_string()]);
    }

    #[test]
    fn test_result_tolerate() {
        let mut r = ScenarioResult::pass();
        r.tolerate("denied");
        assert!(r.is_tolerated());
        assert!(r.is_pass());
        assert_eq!(r.notes().len(), 1);
    }

    #[test]
    fn test_scenario_error_classification() {
        let e: ScenarioError = ProbeFailure::PermissionDenied("x".into()).into();
        assert!(e.is_permission_denied());
        let e: ScenarioError = ProbeFailure::InvalidArgument("x".into()).into();
        assert!(e.is_argument_validation());
        assert!(!ScenarioError::Aborted("x".into()).is_permission_denied());
    }

    #[test]
    fn test_registry_runs_scenario_body() {
        let meta = registry();
        let mut target = InMemoryTarget::from_metadata(&meta, &TypeRef::new("Widget")).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let mut reg = ScenarioRegistry::new().with_scenario(
            ScenarioDescriptor::builder("Name", "XWidget").property().build(),
            |ctx| {
                ctx.set("Name", Value::Str("hello".into()))?;
                let back = ctx.get("Name")?;
                let mut r = ScenarioResult::new();
                r.check(back == Value::Str("hello".into()), "read back mismatch");
                Ok(r)
            },
        );
        assert_eq!(reg.len(), 1);
        let descriptor = reg.descriptors().remove(0);

        let scenario = reg.scenario_mut(0).unwrap();
        let mut ctx = ScenarioContext {
            target: &mut target,
            meta: &meta,
            rng: &mut rng,
            args: Vec::new(),
            descriptor: &descriptor,
        };
        assert!(scenario.run(&mut ctx).unwrap().is_pass());
    }

    #[test]
    fn test_raise_hooks_keyed_by_convention() {
        let mut reg = ScenarioRegistry::new().with_raise_hook("Paint", |t| {
            t.invoke("OnPaint", &[]).map(|_| ())
        });
        assert!(reg.has_raise_hook("RaisePaint"));
        assert!(!reg.has_raise_hook("Paint"));
        assert!(reg.raise_hook_mut("RaisePaint").is_some());
        assert!(reg.is_empty());
    }
}
