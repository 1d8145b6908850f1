use crate::query::ValidateError;
use derive_more::Display;
use thiserror::Error as ThisError;

///
/// Error
///
/// Top-level failure returned by a session.
/// Validation failures never reach storage; storage failures pass through unchanged.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Validate(#[from] ValidateError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Schema(#[from] tutordb_schema::Error),
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validate(err) => err.kind(),
            Self::Storage(_) => ErrorKind::Storage,
            Self::Schema(_) => ErrorKind::Schema,
        }
    }

    /// Field path of a validation failure, when one was recorded.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Validate(err) => err.path(),
            _ => None,
        }
    }
}

///
/// ErrorKind
///
/// Stable classification of every failure surfaced by this crate.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ErrorKind {
    UnknownField,
    OperatorNotSupported,
    CardinalityViolation,
    MalformedCompoundKey,
    AmbiguousNull,
    InvalidValue,
    MissingField,
    LimitExceeded,
    Storage,
    Schema,
}

impl ErrorKind {
    /// Whether the failure was detected before storage was called.
    #[must_use]
    pub const fn is_validation(self) -> bool {
        !matches!(self, Self::Storage | Self::Schema)
    }
}

///
/// StorageError
///
/// Opaque failure reported by the storage engine.
/// This layer never interprets or retries it.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct StorageError {
    pub code: Option<String>,
    pub message: String,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}
