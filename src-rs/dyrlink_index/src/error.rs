//! Errors raised by the device index.

use std::fmt;

use dyrlink_ir::{DeviceRef, FieldName};
use dyrlink_shared::error::{AsDyrlinkError, Context};

/// An error raised by a device index operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// A device with the same type and key is already registered.
    DuplicateKey {
        /// The device that could not be registered
        device: DeviceRef,
    },
    /// No device with this type and key is registered.
    UnknownDevice {
        /// The device that was looked up
        device: DeviceRef,
    },
    /// The device never produced the requested field.
    MissingAttribute {
        /// The device that was read
        device: DeviceRef,
        /// The requested field
        field: FieldName,
        /// The fields the device does have
        available: Vec<FieldName>,
    },
}

impl IndexError {
    /// Creates a new duplicate key error.
    #[must_use]
    pub const fn duplicate_key(device: DeviceRef) -> Self {
        Self::DuplicateKey { device }
    }

    /// Creates a new unknown device error.
    #[must_use]
    pub const fn unknown_device(device: DeviceRef) -> Self {
        Self::UnknownDevice { device }
    }

    /// Creates a new missing attribute error.
    #[must_use]
    pub const fn missing_attribute(
        device: DeviceRef,
        field: FieldName,
        available: Vec<FieldName>,
    ) -> Self {
        Self::MissingAttribute {
            device,
            field,
            available,
        }
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateKey { device } => {
                write!(f, "device `{device}` is already registered")
            }
            Self::UnknownDevice { device } => write!(f, "device `{device}` is not registered"),
            Self::MissingAttribute { device, field, .. } => {
                write!(f, "device `{device}` has no field `{field}`")
            }
        }
    }
}

impl AsDyrlinkError for IndexError {
    fn message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Vec<Context> {
        match self {
            Self::DuplicateKey { .. } => vec![Context::Help(
                "identity keys must be unique within a device type".to_string(),
            )],
            Self::UnknownDevice { .. } => vec![],
            Self::MissingAttribute { available, .. } if available.is_empty() => {
                vec![Context::Note("the device has no fields".to_string())]
            }
            Self::MissingAttribute { available, .. } => {
                let available = available
                    .iter()
                    .map(|field| format!("`{field}`"))
                    .collect::<Vec<_>>()
                    .join(", ");
                vec![Context::Note(format!("available fields are {available}"))]
            }
        }
    }
}
