//! Import pass options.

/// Options for an import pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportOptions {
    strict: bool,
    max_failures: Option<usize>,
}

impl ImportOptions {
    /// Creates options that skip failed records and never stop early.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            strict: false,
            max_failures: None,
        }
    }

    /// Sets whether the first failed record ends the pass.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets the number of failed records after which the pass is abandoned.
    #[must_use]
    pub const fn with_max_failures(mut self, max_failures: Option<usize>) -> Self {
        self.max_failures = max_failures;
        self
    }

    /// Returns whether the first failed record ends the pass.
    #[must_use]
    pub const fn strict(&self) -> bool {
        self.strict
    }

    /// Returns the number of failed records after which the pass is
    /// abandoned.
    #[must_use]
    pub const fn max_failures(&self) -> Option<usize> {
        self.max_failures
    }
}
