//! The structured report of an import pass.

use std::fmt;

use dyrlink_ir::{ModelType, RawRecord};
use dyrlink_schema::SchemaRegistry;
use dyrlink_shared::error::{DyrlinkError, RecordLocation};

use crate::{error::ResolutionError, stage::ResolutionStage};

/// A record that could not be resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    position: usize,
    model_type: ModelType,
    identity: String,
    stage: ResolutionStage,
    error: ResolutionError,
}

impl RecordFailure {
    /// Creates a new record failure.
    #[must_use]
    pub const fn new(
        position: usize,
        model_type: ModelType,
        identity: String,
        stage: ResolutionStage,
        error: ResolutionError,
    ) -> Self {
        Self {
            position,
            model_type,
            identity,
            stage,
            error,
        }
    }

    /// Returns the 0-indexed position of the record in the input.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the declared model type of the record.
    #[must_use]
    pub const fn model_type(&self) -> &ModelType {
        &self.model_type
    }

    /// Returns the rendered identity fields of the record.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
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

    /// Returns where in the input the failure occurred.
    #[must_use]
    pub fn location(&self) -> RecordLocation {
        RecordLocation::new(self.position, self.model_type.as_str(), self.identity.as_str())
    }

    /// Converts the failure into a diagnostic.
    #[must_use]
    pub fn to_diagnostic(&self) -> DyrlinkError {
        DyrlinkError::from_error(&self.error, Some(self.location()))
    }
}

/// Renders the identity fields of a record, such as `BUS = 5, ID = '1'`.
///
/// Records of unknown model types have no known identity fields and render
/// as the empty string.
#[must_use]
pub fn render_identity(record: &RawRecord, registry: &SchemaRegistry) -> String {
    let Ok(rule_set) = registry.lookup(record.model_type()) else {
        return String::new();
    };

    rule_set
        .identity_inputs()
        .into_iter()
        .filter_map(|field| record.get(field).map(|value| format!("{field} = {value}")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Why an import pass stopped before the end of its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// A record had a model type with no rule set.
    UnknownModelType,
    /// A record failed in strict mode.
    Strict,
    /// The configured number of failed records was reached.
    FailureLimit(usize),
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownModelType => f.write_str("unknown model type"),
            Self::Strict => f.write_str("strict mode"),
            Self::FailureLimit(limit) => write!(f, "failure limit of {limit} reached"),
        }
    }
}

/// How an import pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassOutcome {
    /// Every record was processed.
    #[default]
    Completed,
    /// Processing stopped after the record at `position`.
    ///
    /// Devices registered before that point remain in the index.
    Aborted {
        /// The position of the last processed record
        position: usize,
        /// Why the pass stopped
        reason: AbortReason,
    },
}

/// The structured report of an import pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportReport {
    resolved: usize,
    failures: Vec<RecordFailure>,
    outcome: PassOutcome,
}

impl ImportReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one successfully resolved record.
    pub const fn record_resolved(&mut self) {
        self.resolved += 1;
    }

    /// Adds a failed record.
    pub fn add_failure(&mut self, failure: RecordFailure) {
        self.failures.push(failure);
    }

    /// Marks the pass as aborted after the record at `position`.
    pub const fn abort(&mut self, position: usize, reason: AbortReason) {
        self.outcome = PassOutcome::Aborted { position, reason };
    }

    /// Returns the number of records that were resolved.
    #[must_use]
    pub const fn resolved(&self) -> usize {
        self.resolved
    }

    /// Returns every failed record in input order.
    #[must_use]
    pub fn failures(&self) -> &[RecordFailure] {
        &self.failures
    }

    /// Returns how the pass ended.
    #[must_use]
    pub const fn outcome(&self) -> PassOutcome {
        self.outcome
    }

    /// Returns whether the pass completed without any failure.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.outcome == PassOutcome::Completed
    }
}
