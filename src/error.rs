//! Error types for the algebra.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of `build`, expansion and decomposition operations.
///
/// Simplification itself never fails: every rewrite is total on well-typed
/// input.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// An operand, guard or tuple element does not have the required type.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// The operation exists but is not implemented for this representation.
    #[error("Not supported: {0}")]
    NotSupported(&'static str),

    /// The input violates a precondition of the operation.
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// A combinatorial construction would exceed the configured bound.
    #[error("Limit exceeded: {what} would produce more than {limit} elements")]
    LimitExceeded { what: &'static str, limit: usize },
}

impl Error {
    pub(crate) fn mismatch(expected: impl ToString, found: impl ToString) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        Error::Precondition(message.into())
    }
}
