/// Contextual information attached to a diagnostic.
///
/// # Examples
///
/// ```rust
/// use dyrlink_shared::error::Context;
///
/// let note = Context::Note("matched on `bus = 5`, `subidx = 1`".to_string());
/// let help = Context::Help("register the `StaticGen` device before this record".to_string());
///
/// let contexts = vec![note, help];
/// assert_eq!(contexts.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Context {
    /// Additional information about the error.
    Note(String),

    /// A suggestion for resolving the error.
    Help(String),
}

impl Context {
    /// Returns the label used when rendering this context (`note` or `help`).
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Note(_) => "note",
            Self::Help(_) => "help",
        }
    }

    /// Returns the text of this context item.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Note(text) | Self::Help(text) => text,
        }
    }
}
