//! Errors raised while resolving a single record.

use std::fmt;

use dyrlink_index::IndexError;
use dyrlink_ir::{DeviceRef, DeviceType, FieldName, ModelType};
use dyrlink_schema::TransformError;
use dyrlink_shared::error::{AsDyrlinkError, Context};

use crate::stage::ResolutionStage;

/// An error that prevents a record from being resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionError {
    /// No rule set is registered for the record's model type.
    UnknownModelType {
        /// The model type
        model_type: ModelType,
    },
    /// The record lacks a declared input field.
    MissingField {
        /// The model type of the record
        model_type: ModelType,
        /// The missing field
        field: FieldName,
    },
    /// No device matched a required relation.
    UnresolvedReference {
        /// The relation, or the get field of a keyed lookup
        relation: String,
        /// The device type or group searched
        target: DeviceType,
        /// The rendered predicate
        predicate: String,
    },
    /// More than one device matched a relation.
    AmbiguousReference {
        /// The relation
        relation: String,
        /// The device type or group searched
        target: DeviceType,
        /// The rendered predicate
        predicate: String,
        /// Every matching device
        candidates: Vec<DeviceRef>,
    },
    /// A related device lacks a field that a get rule reads.
    MissingAttribute {
        /// The device that was read
        device: DeviceRef,
        /// The field that was requested
        field: FieldName,
        /// The fields the device does have
        available: Vec<FieldName>,
    },
    /// A device with the same type and identity key already exists.
    DuplicateKey {
        /// The device that could not be registered
        device: DeviceRef,
    },
    /// An output transform failed.
    Transform {
        /// The output field
        field: FieldName,
        /// The transform error
        error: TransformError,
    },
    /// The identity key could not be derived.
    InvalidIdentity {
        /// The model type of the record
        model_type: ModelType,
        /// Why no key could be derived
        reason: String,
    },
}

impl ResolutionError {
    /// Creates a new unknown model type error.
    #[must_use]
    pub const fn unknown_model_type(model_type: ModelType) -> Self {
        Self::UnknownModelType { model_type }
    }

    /// Creates a new missing field error.
    #[must_use]
    pub const fn missing_field(model_type: ModelType, field: FieldName) -> Self {
        Self::MissingField { model_type, field }
    }

    /// Creates a new unresolved reference error.
    #[must_use]
    pub const fn unresolved_reference(
        relation: String,
        target: DeviceType,
        predicate: String,
    ) -> Self {
        Self::UnresolvedReference {
            relation,
            target,
            predicate,
        }
    }

    /// Creates a new ambiguous reference error.
    #[must_use]
    pub const fn ambiguous_reference(
        relation: String,
        target: DeviceType,
        predicate: String,
        candidates: Vec<DeviceRef>,
    ) -> Self {
        Self::AmbiguousReference {
            relation,
            target,
            predicate,
            candidates,
        }
    }

    /// Creates a new transform error.
    #[must_use]
    pub const fn transform(field: FieldName, error: TransformError) -> Self {
        Self::Transform { field, error }
    }

    /// Creates a new invalid identity error.
    #[must_use]
    pub fn invalid_identity(model_type: ModelType, reason: impl Into<String>) -> Self {
        Self::InvalidIdentity {
            model_type,
            reason: reason.into(),
        }
    }

    /// Converts an error from reading or writing the device index.
    ///
    /// `relation` names the rule that was reading, for the case where the
    /// device itself does not exist.
    #[must_use]
    pub fn from_index_error(relation: &str, error: IndexError) -> Self {
        match error {
            IndexError::DuplicateKey { device } => Self::DuplicateKey { device },
            IndexError::UnknownDevice { device } => Self::UnresolvedReference {
                relation: relation.to_string(),
                predicate: format!("{} = {}", FieldName::IDX, device.key()),
                target: device.device_type().clone(),
            },
            IndexError::MissingAttribute {
                device,
                field,
                available,
            } => Self::MissingAttribute {
                device,
                field,
                available,
            },
        }
    }

    /// Returns whether this error ends the whole import pass.
    ///
    /// An unknown model type is a configuration defect rather than a data
    /// defect, so it is never skipped.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::UnknownModelType { .. })
    }

    /// Returns a short name for the kind of error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownModelType { .. } => "UnknownModelType",
            Self::MissingField { .. } => "MissingField",
            Self::UnresolvedReference { .. } => "UnresolvedReference",
            Self::AmbiguousReference { .. } => "AmbiguousReference",
            Self::MissingAttribute { .. } => "MissingAttribute",
            Self::DuplicateKey { .. } => "DuplicateKey",
            Self::Transform { .. } => "TransformError",
            Self::InvalidIdentity { .. } => "InvalidIdentity",
        }
    }
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownModelType { model_type } => {
                write!(f, "no rule set is registered for model `{model_type}`")
            }
            Self::MissingField { model_type, field } => {
                write!(f, "`{model_type}` record is missing field `{field}`")
            }
            Self::UnresolvedReference {
                relation, target, ..
            } => write!(f, "no `{target}` device found for `{relation}`"),
            Self::AmbiguousReference {
                relation,
                target,
                candidates,
                ..
            } => write!(
                f,
                "{} `{target}` devices match `{relation}`",
                candidates.len()
            ),
            Self::MissingAttribute { device, field, .. } => {
                write!(f, "device `{device}` has no field `{field}`")
            }
            Self::DuplicateKey { device } => {
                write!(f, "device `{device}` is already registered")
            }
            Self::Transform { field, error } => write!(f, "output `{field}`: {error}"),
            Self::InvalidIdentity { model_type, reason } => {
                write!(f, "cannot derive a `{model_type}` identity key: {reason}")
            }
        }
    }
}

impl AsDyrlinkError for ResolutionError {
    fn message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Vec<Context> {
        match self {
            Self::UnknownModelType { .. } => vec![Context::Help(
                "register a rule set for the model or remove its records".to_string(),
            )],
            Self::MissingField { .. } | Self::InvalidIdentity { .. } => vec![],
            Self::UnresolvedReference { predicate, .. } => vec![
                Context::Note(format!("searched for {predicate}")),
                Context::Help(
                    "records must come after the records of the devices they refer to"
                        .to_string(),
                ),
            ],
            Self::AmbiguousReference {
                predicate,
                candidates,
                ..
            } => {
                let candidates = candidates
                    .iter()
                    .map(|device| format!("`{device}`"))
                    .collect::<Vec<_>>()
                    .join(", ");
                vec![
                    Context::Note(format!("searched for {predicate}")),
                    Context::Note(format!("matching devices are {candidates}")),
                ]
            }
            Self::MissingAttribute {
                device,
                field,
                available,
            } => IndexError::missing_attribute(device.clone(), field.clone(), available.clone())
                .context(),
            Self::DuplicateKey { device } => {
                IndexError::duplicate_key(device.clone()).context()
            }
            Self::Transform { error, .. } => error.context(),
        }
    }
}

/// A resolution error together with the stage the record was trying to
/// reach when it occurred.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionFailure {
    stage: ResolutionStage,
    error: ResolutionError,
}

impl ResolutionFailure {
    /// Creates a new resolution failure.
    #[must_use]
    pub const fn new(stage: ResolutionStage, error: ResolutionError) -> Self {
        Self { stage, error }
    }

    /// Returns the stage the record was trying to reach.
    #[must_use]
    pub const fn stage(&self) -> ResolutionStage {
        self.stage
    }

    /// Returns the error.
    #[must_use]
    pub const fn error(&self) -> &ResolutionError {
        &self.error
    }

    /// Returns the error, consuming the failure.
    #[must_use]
    pub fn into_error(self) -> ResolutionError {
        self.error
    }
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (while {})", self.error, self.stage.activity())
    }
}
