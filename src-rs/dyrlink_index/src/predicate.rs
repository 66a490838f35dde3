//! Relational predicates over resolved devices.

use std::fmt;

use dyrlink_ir::{DeviceRef, FieldName, ResolvedDevice, Value};

/// A conjunction of field equalities.
///
/// The reserved field `idx` compares against the device's key rather than a
/// field. It accepts either a device reference or a scalar naming a
/// single-component key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Predicate {
    clauses: Vec<(FieldName, Value)>,
}

impl Predicate {
    /// Creates a predicate that matches every device.
    #[must_use]
    pub const fn new() -> Self {
        Self { clauses: vec![] }
    }

    /// Adds an equality clause.
    #[must_use]
    pub fn with(mut self, field: FieldName, value: Value) -> Self {
        self.clauses.push((field, value));
        self
    }

    /// Returns the clauses in the order they were added.
    #[must_use]
    pub fn clauses(&self) -> &[(FieldName, Value)] {
        &self.clauses
    }

    /// Returns whether any clause compares against the absent value.
    ///
    /// Such a predicate matches no device.
    #[must_use]
    pub fn has_absent_value(&self) -> bool {
        self.clauses.iter().any(|(_, value)| value.is_absent())
    }

    /// Returns whether the device satisfies every clause.
    #[must_use]
    pub fn matches(&self, device: &ResolvedDevice) -> bool {
        self.clauses.iter().all(|(field, value)| {
            if field.is_idx() {
                key_matches(device, value)
            } else {
                device
                    .get(field)
                    .is_some_and(|candidate| candidate.loosely_equals(value))
            }
        })
    }
}

fn key_matches(device: &ResolvedDevice, value: &Value) -> bool {
    match value {
        Value::Device(reference) => *reference == device.to_ref(),
        Value::Number(_) | Value::String(_) | Value::Sequence(_) | Value::Absent => {
            value.to_key().is_some_and(|key| key == *device.key())
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses = self
            .clauses
            .iter()
            .map(|(field, value)| format!("{field} = {value}"))
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&clauses)
    }
}

/// The outcome of a single-device relational query.
#[derive(Debug, Clone, PartialEq)]
pub enum FindResult<'a> {
    /// Exactly one device matched.
    Found(&'a ResolvedDevice),
    /// No device matched.
    NotFound,
    /// More than one device matched.
    Ambiguous(Vec<DeviceRef>),
}
