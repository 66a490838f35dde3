//! The resolution state machine.

use std::fmt;

/// The stages a record passes through while it is resolved.
///
/// A successful resolution ends in `Instantiated`. A failure records the
/// stage the record was trying to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResolutionStage {
    /// The model type is known and every declared input is present.
    Validated,
    /// Every find rule has bound its relation.
    FindResolved,
    /// Every get rule has bound its value.
    AttributesGathered,
    /// Every output field has been computed.
    OutputsComputed,
    /// The device has been keyed and registered.
    Instantiated,
}

impl ResolutionStage {
    /// Describes the work done to reach this stage.
    #[must_use]
    pub const fn activity(self) -> &'static str {
        match self {
            Self::Validated => "validating the record",
            Self::FindResolved => "finding related devices",
            Self::AttributesGathered => "reading related device fields",
            Self::OutputsComputed => "computing outputs",
            Self::Instantiated => "registering the device",
        }
    }
}

impl fmt::Display for ResolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validated => "validated",
            Self::FindResolved => "find-resolved",
            Self::AttributesGathered => "attributes-gathered",
            Self::OutputsComputed => "outputs-computed",
            Self::Instantiated => "instantiated",
        };
        f.write_str(name)
    }
}
