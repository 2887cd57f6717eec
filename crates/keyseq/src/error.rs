#![forbid(unsafe_code)]

//! Errors raised by mutating operations on a [`KeyedSequence`].
//!
//! Every error is detected before the sequence is touched: a failed call
//! leaves contents, version, and subscribers as they were and emits no
//! notification. A key lookup that matches nothing is not an error; it
//! returns `None`.
//!
//! [`KeyedSequence`]: crate::KeyedSequence

/// Errors from sequence mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    /// An absent element was offered for storage.
    ///
    /// `position` is the offset of the first absent element within the
    /// input; single-element operations report 0.
    #[error("trying to add an absent element (input position {position})")]
    InvalidElement { position: usize },
    /// A positional operation received an index outside its bound.
    #[error("index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    /// A range removal received `start > end` or `end > len`.
    #[error("range {start}..{end} out of range for sequence of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },
}

/// Result alias for sequence operations.
pub type Result<T, E = SequenceError> = std::result::Result<T, E>;
