use std::fmt;

/// Where in the record stream a diagnostic originated.
///
/// Positions are 0-indexed offsets into the input sequence. The identity is
/// a pre-rendered summary of the record's identity fields, for example
/// `BUS = 5, ID = '1'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLocation {
    position: usize,
    model_type: String,
    identity: String,
}

impl RecordLocation {
    /// Creates a new record location.
    #[must_use]
    pub fn new(position: usize, model_type: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            position,
            model_type: model_type.into(),
            identity: identity.into(),
        }
    }

    /// Returns the 0-indexed position of the record in the input sequence.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the declared model type of the record.
    #[must_use]
    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    /// Returns the rendered identity fields of the record.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }
}

impl fmt::Display for RecordLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record #{} ({}", self.position, self.model_type)?;
        if !self.identity.is_empty() {
            write!(f, " {}", self.identity)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_identity() {
        let location = RecordLocation::new(3, "GENROU", "BUS = 5, ID = '1'");
        assert_eq!(location.to_string(), "record #3 (GENROU BUS = 5, ID = '1')");
    }

    #[test]
    fn display_without_identity() {
        let location = RecordLocation::new(0, "TGOV1", "");
        assert_eq!(location.to_string(), "record #0 (TGOV1)");
    }
}
