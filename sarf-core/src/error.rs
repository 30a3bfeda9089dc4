//! Error types for the morphology core
//!
//! Fatal conditions are split by kind so that a caller can decide whether to
//! abandon a single token, a batch, or the whole process.

use thiserror::Error;

/// Broad classification of a [`MorphError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A fixed-capacity bound was exceeded
    Capacity,
    /// The input (word, rule file, lexicon file) is malformed
    Input,
    /// Internal data disagrees with itself
    Internal,
    /// Reading a resource failed
    Io,
}

/// Errors raised by the morphology core
#[derive(Debug, Error)]
pub enum MorphError {
    /// Input longer than the normalizer can hold
    #[error("input too large to normalize ({len} chars, max {max}): {input}")]
    InputTooLarge {
        /// The offending string
        input: String,
        /// Its length in characters
        len: usize,
        /// The configured maximum
        max: usize,
    },

    /// A fixed-capacity table or buffer overflowed
    #[error("capacity exceeded: {what} (limit {limit})")]
    CapacityExceeded {
        /// Which bound was hit
        what: &'static str,
        /// The bound itself
        limit: usize,
    },

    /// Malformed resource or input
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Missing entry, inconsistent counts and similar
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),

    /// I/O error while reading a resource
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Lexicon JSON could not be decoded
    #[error("lexicon decode error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MorphError {
    /// Shorthand for a capacity violation
    pub fn capacity(what: &'static str, limit: usize) -> Self {
        MorphError::CapacityExceeded { what, limit }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MorphError::CapacityExceeded { .. } => ErrorKind::Capacity,
            MorphError::InputTooLarge { .. }
            | MorphError::MalformedInput(_)
            | MorphError::Json(_) => ErrorKind::Input,
            MorphError::InternalInconsistency(_) => ErrorKind::Internal,
            MorphError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, MorphError>;
