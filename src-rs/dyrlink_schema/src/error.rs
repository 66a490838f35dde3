//! Errors raised while building the schema registry.
//!
//! All of these are configuration defects. A registry that fails to build
//! cannot be used to resolve any record.

use std::fmt;

use dyrlink_ir::{DeviceType, FieldName, ModelType};
use dyrlink_shared::error::{AsDyrlinkError, Context};

use crate::transform::TransformError;

/// An error in a rule set or group definition.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A rule set for this model type is already registered.
    DuplicateModelType {
        /// The model type
        model_type: ModelType,
    },
    /// No rule set is registered for this model type.
    UnknownModelType {
        /// The model type
        model_type: ModelType,
    },
    /// A rule refers to a name that is not bound at that point.
    UnboundReference {
        /// The model type of the rule set
        model_type: ModelType,
        /// The rule containing the reference, such as ``find `syn` ``
        rule: String,
        /// The unbound name
        name: String,
        /// Whether the name is bound by a later rule
        declared_later: bool,
    },
    /// A find rule depends, directly or transitively, on its own relation.
    CircularReference {
        /// The model type of the rule set
        model_type: ModelType,
        /// The relations forming the cycle, first repeated at the end
        chain: Vec<String>,
    },
    /// A name is bound twice within one rule set.
    DuplicateBinding {
        /// The model type of the rule set
        model_type: ModelType,
        /// The name bound twice
        name: String,
    },
    /// A name used as a relation is bound to something else.
    NotARelation {
        /// The model type of the rule set
        model_type: ModelType,
        /// The rule containing the reference
        rule: String,
        /// The name
        name: String,
    },
    /// An output transform could not be parsed.
    InvalidTransform {
        /// The model type of the rule set
        model_type: ModelType,
        /// The output field the transform belongs to
        field: FieldName,
        /// The parse error
        error: TransformError,
    },
    /// The identity rule cannot produce a key.
    InvalidIdentity {
        /// The model type of the rule set
        model_type: ModelType,
        /// Why the identity rule is invalid
        reason: String,
    },
    /// A group with this name is already registered.
    DuplicateGroup {
        /// The group name
        group: DeviceType,
    },
    /// A get rule reads a field that the related device type never produces.
    UnknownSourceField {
        /// The model type of the rule set
        model_type: ModelType,
        /// The get rule's destination field
        field: FieldName,
        /// The device type that lacks the field
        device_type: DeviceType,
        /// The missing source field
        src: FieldName,
    },
}

impl SchemaError {
    /// Creates a new duplicate model type error.
    #[must_use]
    pub const fn duplicate_model_type(model_type: ModelType) -> Self {
        Self::DuplicateModelType { model_type }
    }

    /// Creates a new unknown model type error.
    #[must_use]
    pub const fn unknown_model_type(model_type: ModelType) -> Self {
        Self::UnknownModelType { model_type }
    }

    /// Creates a new unbound reference error.
    #[must_use]
    pub const fn unbound_reference(
        model_type: ModelType,
        rule: String,
        name: String,
        declared_later: bool,
    ) -> Self {
        Self::UnboundReference {
            model_type,
            rule,
            name,
            declared_later,
        }
    }

    /// Creates a new circular reference error.
    #[must_use]
    pub const fn circular_reference(model_type: ModelType, chain: Vec<String>) -> Self {
        Self::CircularReference { model_type, chain }
    }

    /// Creates a new duplicate binding error.
    #[must_use]
    pub const fn duplicate_binding(model_type: ModelType, name: String) -> Self {
        Self::DuplicateBinding { model_type, name }
    }

    /// Creates a new error for a name used as a relation that is not one.
    #[must_use]
    pub const fn not_a_relation(model_type: ModelType, rule: String, name: String) -> Self {
        Self::NotARelation {
            model_type,
            rule,
            name,
        }
    }

    /// Creates a new invalid transform error.
    #[must_use]
    pub const fn invalid_transform(
        model_type: ModelType,
        field: FieldName,
        error: TransformError,
    ) -> Self {
        Self::InvalidTransform {
            model_type,
            field,
            error,
        }
    }

    /// Creates a new invalid identity error.
    #[must_use]
    pub fn invalid_identity(model_type: ModelType, reason: impl Into<String>) -> Self {
        Self::InvalidIdentity {
            model_type,
            reason: reason.into(),
        }
    }

    /// Creates a new duplicate group error.
    #[must_use]
    pub const fn duplicate_group(group: DeviceType) -> Self {
        Self::DuplicateGroup { group }
    }

    /// Creates a new unknown source field error.
    #[must_use]
    pub const fn unknown_source_field(
        model_type: ModelType,
        field: FieldName,
        device_type: DeviceType,
        src: FieldName,
    ) -> Self {
        Self::UnknownSourceField {
            model_type,
            field,
            device_type,
            src,
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateModelType { model_type } => {
                write!(f, "rule set for model `{model_type}` is already registered")
            }
            Self::UnknownModelType { model_type } => {
                write!(f, "no rule set is registered for model `{model_type}`")
            }
            Self::UnboundReference {
                model_type,
                rule,
                name,
                declared_later: _,
            } => write!(f, "{rule} in model `{model_type}` refers to unbound name `{name}`"),
            Self::CircularReference { model_type, chain } => {
                let chain = chain.join(" -> ");
                write!(f, "circular find chain in model `{model_type}` - {chain}")
            }
            Self::DuplicateBinding { model_type, name } => {
                write!(f, "name `{name}` is bound more than once in model `{model_type}`")
            }
            Self::NotARelation {
                model_type,
                rule,
                name,
            } => write!(
                f,
                "{rule} in model `{model_type}` uses `{name}` as a relation, but it is not bound by a find rule"
            ),
            Self::InvalidTransform {
                model_type,
                field,
                error,
            } => write!(f, "output `{field}` in model `{model_type}`: {error}"),
            Self::InvalidIdentity { model_type, reason } => {
                write!(f, "invalid identity for model `{model_type}`: {reason}")
            }
            Self::DuplicateGroup { group } => {
                write!(f, "device group `{group}` is already registered")
            }
            Self::UnknownSourceField {
                model_type,
                field,
                device_type,
                src,
            } => write!(
                f,
                "get `{field}` in model `{model_type}` reads `{src}`, which `{device_type}` never produces"
            ),
        }
    }
}

impl AsDyrlinkError for SchemaError {
    fn message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Vec<Context> {
        match self {
            Self::UnboundReference {
                name,
                declared_later: true,
                ..
            } => vec![
                Context::Note(format!("`{name}` is bound by a later rule")),
                Context::Help(
                    "rules may only refer to inputs and to names bound by earlier rules"
                        .to_string(),
                ),
            ],
            Self::UnboundReference {
                declared_later: false,
                ..
            } => vec![Context::Help(
                "declare the field as an input or bind it with a find or get rule".to_string(),
            )],
            Self::InvalidTransform { error, .. } => error.context(),
            Self::DuplicateModelType { .. }
            | Self::UnknownModelType { .. }
            | Self::CircularReference { .. }
            | Self::DuplicateBinding { .. }
            | Self::NotARelation { .. }
            | Self::InvalidIdentity { .. }
            | Self::DuplicateGroup { .. }
            | Self::UnknownSourceField { .. } => vec![],
        }
    }
}
