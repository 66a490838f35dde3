//! Errors for the dyrlink resolver

mod context;
mod location;
mod traits;

pub use context::Context;
pub use location::RecordLocation;
pub use traits::AsDyrlinkError;

/// Unified error representation for dyrlink.
///
/// This struct represents errors in a format suitable for display to users.
/// It carries a human-readable message, the record the error is attributed
/// to (if any) and any context the original error supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DyrlinkError {
    /// Human-readable error message
    message: String,
    /// The record the error is attributed to, if the error is record-local
    location: Option<RecordLocation>,
    /// Notes and help attached by the originating error
    context: Vec<Context>,
}

impl DyrlinkError {
    /// Creates a new `DyrlinkError` from an error that implements `AsDyrlinkError`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dyrlink_shared::error::{AsDyrlinkError, DyrlinkError, RecordLocation};
    ///
    /// struct SimpleError(String);
    ///
    /// impl AsDyrlinkError for SimpleError {
    ///     fn message(&self) -> String {
    ///         self.0.clone()
    ///     }
    /// }
    ///
    /// let error = SimpleError("something went wrong".to_string());
    /// let location = RecordLocation::new(2, "GENCLS", "BUS = 1, ID = '1'");
    /// let error = DyrlinkError::from_error(&error, Some(location));
    ///
    /// assert_eq!(error.message(), "something went wrong");
    /// assert_eq!(error.location().map(RecordLocation::position), Some(2));
    /// ```
    pub fn from_error(error: &impl AsDyrlinkError, location: Option<RecordLocation>) -> Self {
        Self {
            message: error.message(),
            location,
            context: error.context(),
        }
    }

    /// Returns the human-readable error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the record the error is attributed to.
    #[must_use]
    pub const fn location(&self) -> Option<&RecordLocation> {
        self.location.as_ref()
    }

    /// Returns the context information.
    #[must_use]
    pub fn context(&self) -> &[Context] {
        &self.context
    }
}
