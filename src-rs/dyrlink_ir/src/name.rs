//! Name types for models, devices, fields and relations.
//!
//! These are thin wrappers around strings so that a field name can never be
//! passed where a relation name is expected.

use std::fmt;

macro_rules! name_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new `", stringify!($name), "`.")]
            pub fn new(name: impl AsRef<str>) -> Self {
                Self(name.as_ref().to_string())
            }

            /// Returns the name as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }
    };
}

name_type!(
    /// The declared type of a raw record, such as `GENROU` or `TGOV1`.
    ModelType
);

name_type!(
    /// The type of a resolved device, or the name of a device group.
    ///
    /// A rule set's destination is always a concrete device type. Find rules
    /// may target a group name, which the schema registry expands into its
    /// member device types.
    DeviceType
);

name_type!(
    /// The name of an input, get or output field.
    FieldName
);

name_type!(
    /// The name under which a find rule binds a related device.
    RelationName
);

impl FieldName {
    /// The reserved predicate field that matches a candidate device's key.
    pub const IDX: &'static str = "idx";

    /// Returns whether this is the reserved `idx` field.
    #[must_use]
    pub fn is_idx(&self) -> bool {
        self.0 == Self::IDX
    }
}

impl From<ModelType> for DeviceType {
    fn from(model_type: ModelType) -> Self {
        Self(model_type.0)
    }
}
