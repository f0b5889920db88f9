//! Error types for the watch-target crate.

/// Errors produced while parsing a selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    /// The selector (or one group of a selector list) was empty
    #[error("Selector is empty")]
    Empty,

    /// A character appeared where the grammar does not allow it
    #[error("Unexpected character {ch:?} at position {position}")]
    UnexpectedChar {
        /// The offending character
        ch: char,
        /// Character offset within the selector
        position: usize,
    },

    /// The selector ended in the middle of a construct
    #[error("Unexpected end of selector")]
    UnexpectedEnd,

    /// An identifier was required (after `#`, `.` or inside `[...]`)
    #[error("Expected identifier at position {position}")]
    ExpectedIdent {
        /// Character offset within the selector
        position: usize,
    },
}

/// Errors produced when building targets from raw values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    /// A property object can only be built from a JSON object
    #[error("Expected a JSON object, got {kind}")]
    NotAnObject {
        /// The JSON kind that was supplied
        kind: &'static str,
    },
}
