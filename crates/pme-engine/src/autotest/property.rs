//! Generated property probes
//!
//! Boolean, enumeration and string properties are driven through a fixed
//! write/read-back sequence and restored to their original value.

use crate::policy::RunPolicies;
use crate::scenario::ScenarioResult;
use pme_meta::{EnumInfo, ProbeFailure, PropertyDescriptor, Target, Value, ValueKind};
use rand::Rng;
use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use tracing::debug;

/// Length range of the short random string
const SHORT_STRING: std::ops::RangeInclusive<usize> = 1..=16;
/// Length range of the long random string
const LONG_STRING: std::ops::RangeInclusive<usize> = 256..=2048;

type Step = Result<(), ProbeFailure>;

/// Drive `property` through the probe sequence for its kind.
///
/// Failures raised by the target are caught here: a permission denial stops
/// the probe and marks it tolerated, anything else is a hard failure.
pub fn probe_property(
    target: &mut dyn Target,
    property: &PropertyDescriptor,
    rng: &mut StdRng,
    policies: &RunPolicies,
) -> ScenarioResult {
    let mut result = ScenarioResult::new();
    let mut probe = PropertyProbe { target, property };
    let outcome = match &property.value_kind {
        ValueKind::Bool => probe.boolean(&mut result),
        ValueKind::Enum(info) if !info.flags => {
            probe.enumeration(info, !policies.no_enum_bounds_test, &mut result)
        }
        ValueKind::Str => probe.string(rng, &mut result),
        other => {
            result.note(format!("no generated probe for {} properties", other.type_ref()));
            Ok(())
        }
    };
    if let Err(failure) = outcome {
        if failure.is_permission_denied() {
            debug!(property = %property.name, %failure, "tolerating permission denial");
            result.tolerate(format!("{}: {failure}", property.name));
        } else {
            result.fail(format!("{}: unexpected failure: {failure}", property.name));
        }
    }
    result
}

/// Equality, except that a null write may read back as the empty string
fn same_value(expected: &Value, actual: &Value) -> bool {
    expected == actual || (*expected == Value::Null && *actual == Value::Str(String::new()))
}

struct PropertyProbe<'a, 'b> {
    target: &'a mut dyn Target,
    property: &'b PropertyDescriptor,
}

impl PropertyProbe<'_, '_> {
    fn get(&mut self) -> Result<Value, ProbeFailure> {
        self.target.invoke(&self.property.getter(), &[])
    }

    fn set(&mut self, value: Value) -> Step {
        self.target.invoke(&self.property.setter(), &[value]).map(|_| ())
    }

    /// Write `value` and check it reads back
    fn round_trip(&mut self, value: Value, result: &mut ScenarioResult) -> Step {
        self.set(value.clone())?;
        let back = self.get()?;
        result.check(
            same_value(&value, &back),
            format!("{}: set {value}, read back {back}", self.property.name),
        );
        Ok(())
    }

    fn restore(&mut self, original: Value, result: &mut ScenarioResult) -> Step {
        self.set(original.clone())?;
        let back = self.get()?;
        result.check(
            same_value(&original, &back),
            format!("{}: restoring {original} left {back}", self.property.name),
        );
        Ok(())
    }

    fn boolean(&mut self, result: &mut ScenarioResult) -> Step {
        let original = self.get()?;
        for value in [true, false] {
            self.round_trip(Value::Bool(value), result)?;
        }
        self.restore(original, result)
    }

    fn enumeration(&mut self, info: &EnumInfo, bounds: bool, result: &mut ScenarioResult) -> Step {
        let original = self.get()?;
        for member in &info.members {
            self.round_trip(Value::Enum(member.value), result)?;
        }
        if bounds {
            let below = info.min().and_then(|v| v.checked_sub(1));
            let above = info.max().and_then(|v| v.checked_add(1));
            for invalid in [below, above].into_iter().flatten() {
                self.out_of_range(invalid, result)?;
            }
        }
        self.restore(original, result)
    }

    /// An undeclared value must raise an argument-validation failure and
    /// leave the property unchanged
    fn out_of_range(&mut self, invalid: i64, result: &mut ScenarioResult) -> Step {
        let property = self.property;
        let name = &property.name;
        let before = self.get()?;
        match self.target.invoke(&property.setter(), &[Value::Enum(invalid)]) {
            Ok(_) => result.fail(format!("{name}: setting undeclared value {invalid} did not fail")),
            Err(e) if e.is_argument_validation() => {}
            Err(e) if e.is_permission_denied() => return Err(e),
            Err(e) => result.fail(format!(
                "{name}: setting undeclared value {invalid} raised {e}, expected an invalid-argument failure"
            )),
        }
        let after = self.get()?;
        result.check(
            after == before,
            format!("{name}: value changed from {before} to {after} after rejected set of {invalid}"),
        );
        Ok(())
    }

    fn string(&mut self, rng: &mut StdRng, result: &mut ScenarioResult) -> Step {
        let original = self.get()?;
        let short = random_string(rng, SHORT_STRING);
        let long = random_string(rng, LONG_STRING);
        for value in [
            Value::Null,
            Value::Str(String::new()),
            Value::Str(short),
            Value::Str(long),
        ] {
            self.round_trip(value, result)?;
        }
        self.restore(original, result)
    }
}

fn random_string(rng: &mut StdRng, len: std::ops::RangeInclusive<usize>) -> String {
    let len = rng.random_range(len);
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
