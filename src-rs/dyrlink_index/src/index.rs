//! The device index.

use indexmap::IndexMap;

use dyrlink_ir::{DeviceKey, DeviceRef, DeviceType, FieldName, ResolvedDevice, Value};

use crate::{
    error::IndexError,
    predicate::{FindResult, Predicate},
};

/// Every resolved device, keyed by device type and identity key.
///
/// Device types and devices are kept in registration order, so iteration
/// and query results are deterministic for a given record sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceIndex {
    devices: IndexMap<DeviceType, IndexMap<DeviceKey, ResolvedDevice>>,
}

impl DeviceIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::DuplicateKey` if a device with the same type and
    /// key is already registered. The existing device is left unchanged.
    pub fn register(&mut self, device: ResolvedDevice) -> Result<DeviceRef, IndexError> {
        let reference = device.to_ref();
        let of_type = self.devices.entry(device.device_type().clone()).or_default();

        if of_type.contains_key(device.key()) {
            return Err(IndexError::duplicate_key(reference));
        }

        tracing::trace!(device = %reference, fields = device.fields().len(), "registered device");
        of_type.insert(device.key().clone(), device);

        Ok(reference)
    }

    /// Looks up a device by type and key.
    #[must_use]
    pub fn get(&self, device_type: &DeviceType, key: &DeviceKey) -> Option<&ResolvedDevice> {
        self.devices.get(device_type)?.get(key)
    }

    /// Looks up the device a reference points to.
    #[must_use]
    pub fn resolve(&self, reference: &DeviceRef) -> Option<&ResolvedDevice> {
        self.get(reference.device_type(), reference.key())
    }

    /// Returns whether a device with this type and key is registered.
    #[must_use]
    pub fn contains(&self, device_type: &DeviceType, key: &DeviceKey) -> bool {
        self.get(device_type, key).is_some()
    }

    /// Reads one field of a device.
    ///
    /// The value is read from the stored device every time, so it always
    /// reflects what the device was registered with.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::UnknownDevice` if no such device is registered,
    /// or `IndexError::MissingAttribute` if the device has no such field.
    pub fn get_attribute(
        &self,
        device_type: &DeviceType,
        key: &DeviceKey,
        field: &FieldName,
    ) -> Result<&Value, IndexError> {
        let reference = || DeviceRef::new(device_type.clone(), key.clone());

        let device = self
            .get(device_type, key)
            .ok_or_else(|| IndexError::unknown_device(reference()))?;

        device.get(field).ok_or_else(|| {
            IndexError::missing_attribute(
                reference(),
                field.clone(),
                device.fields().keys().cloned().collect(),
            )
        })
    }

    /// Finds the single device among the given types that satisfies the
    /// predicate.
    ///
    /// Types are scanned in the order given and devices in registration
    /// order. A predicate with an absent value matches nothing.
    #[must_use]
    pub fn find_one(&self, device_types: &[DeviceType], predicate: &Predicate) -> FindResult<'_> {
        if predicate.has_absent_value() {
            return FindResult::NotFound;
        }

        let mut matches = device_types
            .iter()
            .filter_map(|device_type| self.devices.get(device_type))
            .flat_map(IndexMap::values)
            .filter(|device| predicate.matches(device));

        match (matches.next(), matches.next()) {
            (None, _) => FindResult::NotFound,
            (Some(device), None) => FindResult::Found(device),
            (Some(first), Some(second)) => {
                let devices = [first, second]
                    .into_iter()
                    .chain(matches)
                    .map(ResolvedDevice::to_ref)
                    .collect();
                FindResult::Ambiguous(devices)
            }
        }
    }

    /// Returns the devices of one type in registration order.
    pub fn devices_of(&self, device_type: &DeviceType) -> impl Iterator<Item = &ResolvedDevice> {
        self.devices
            .get(device_type)
            .into_iter()
            .flat_map(IndexMap::values)
    }

    /// Returns the device types that have at least one device, in the
    /// order their first device was registered.
    pub fn device_types(&self) -> impl Iterator<Item = &DeviceType> {
        self.devices
            .iter()
            .filter(|(_, devices)| !devices.is_empty())
            .map(|(device_type, _)| device_type)
    }

    /// Returns every device, grouped by type.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedDevice> {
        self.devices.values().flat_map(IndexMap::values)
    }

    /// Returns the total number of devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.values().map(IndexMap::len).sum()
    }

    /// Returns whether the index holds no devices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
