use crate::error::Context;

/// Trait for types that can be converted to dyrlink diagnostics.
///
/// Every error produced by the schema registry, the device index and the
/// resolver implements this trait so that front ends can render them in a
/// uniform way.
pub trait AsDyrlinkError {
    /// Returns the primary error message.
    ///
    /// This should be a concise description of what went wrong, written so
    /// that it reads naturally after an `error: ` prefix.
    fn message(&self) -> String;

    /// Returns additional context information about the error.
    ///
    /// Context provides supplementary notes or help text, such as the
    /// predicate that failed to match or the fields that were available.
    ///
    /// Returns an empty vector if no context is available.
    fn context(&self) -> Vec<Context> {
        vec![]
    }
}
