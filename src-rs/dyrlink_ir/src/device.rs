//! Resolved devices and the keys that identify them.

use std::fmt;

use indexmap::IndexMap;

use crate::{
    name::{DeviceType, FieldName},
    value::Value,
};

/// The identity key of a device within its device type.
///
/// A key is the ordered tuple of identity components, for example the bus
/// number and machine identifier of a generator. It renders with the
/// components joined by `_` (`5_1`), but two keys are equal only when their
/// components are, so `(5, "1_2")` and `("5_1", 2)` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceKey(Vec<String>);

impl DeviceKey {
    const SEPARATOR: &'static str = "_";

    /// Creates a key with a single component.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(vec![key.into()])
    }

    /// Creates a key from its components, in order.
    #[must_use]
    pub fn from_components<S: Into<String>>(components: impl IntoIterator<Item = S>) -> Self {
        Self(components.into_iter().map(Into::into).collect())
    }

    /// Composes a key from identity values.
    ///
    /// A device reference contributes every component of the referenced
    /// device's key. Returns `None` if there are no components or if any
    /// value cannot be part of a key (sequences and absent values).
    #[must_use]
    pub fn compose<'a>(values: impl IntoIterator<Item = &'a Value>) -> Option<Self> {
        let mut components = vec![];
        for value in values {
            components.extend(value.to_key()?.0);
        }

        if components.is_empty() {
            None
        } else {
            Some(Self(components))
        }
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(Self::SEPARATOR))
    }
}

/// A reference to a device by its concrete type and key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceRef {
    device_type: DeviceType,
    key: DeviceKey,
}

impl DeviceRef {
    /// Creates a new device reference.
    #[must_use]
    pub const fn new(device_type: DeviceType, key: DeviceKey) -> Self {
        Self { device_type, key }
    }

    /// Returns the concrete device type.
    #[must_use]
    pub const fn device_type(&self) -> &DeviceType {
        &self.device_type
    }

    /// Returns the device key.
    #[must_use]
    pub const fn key(&self) -> &DeviceKey {
        &self.key
    }
}

impl fmt::Display for DeviceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.device_type, self.key)
    }
}

/// A fully resolved device instance.
///
/// Devices are immutable once created. Later records may read their fields
/// through find and get rules but never modify them.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDevice {
    device_type: DeviceType,
    key: DeviceKey,
    fields: IndexMap<FieldName, Value>,
}

impl ResolvedDevice {
    /// Creates a new device with the given output fields.
    #[must_use]
    pub const fn new(
        device_type: DeviceType,
        key: DeviceKey,
        fields: IndexMap<FieldName, Value>,
    ) -> Self {
        Self {
            device_type,
            key,
            fields,
        }
    }

    /// Returns the device type.
    #[must_use]
    pub const fn device_type(&self) -> &DeviceType {
        &self.device_type
    }

    /// Returns the identity key.
    #[must_use]
    pub const fn key(&self) -> &DeviceKey {
        &self.key
    }

    /// Returns a reference to this device.
    #[must_use]
    pub fn to_ref(&self) -> DeviceRef {
        DeviceRef::new(self.device_type.clone(), self.key.clone())
    }

    /// Looks up an output field.
    #[must_use]
    pub fn get(&self, field: &FieldName) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns all output fields in the order they were produced.
    #[must_use]
    pub const fn fields(&self) -> &IndexMap<FieldName, Value> {
        &self.fields
    }
}
