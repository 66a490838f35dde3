//! Raw records as produced by a dynamic-data reader.

use indexmap::IndexMap;

use crate::{
    name::{FieldName, ModelType},
    value::Value,
};

/// One parsed dynamic-data record.
///
/// A record is transient: it is consumed by a single resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    model_type: ModelType,
    fields: IndexMap<FieldName, Value>,
}

impl RawRecord {
    /// Creates a record with the given fields.
    #[must_use]
    pub const fn new(model_type: ModelType, fields: IndexMap<FieldName, Value>) -> Self {
        Self { model_type, fields }
    }

    /// Returns the declared model type.
    #[must_use]
    pub const fn model_type(&self) -> &ModelType {
        &self.model_type
    }

    /// Looks up a field.
    #[must_use]
    pub fn get(&self, field: &FieldName) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns all fields in the order they were supplied.
    #[must_use]
    pub const fn fields(&self) -> &IndexMap<FieldName, Value> {
        &self.fields
    }
}
