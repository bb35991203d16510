//! Error types for irecord.
//!
//! All errors are strongly typed using thiserror, so callers can match on
//! the exact condition that stopped a `set` or a direct write.

use thiserror::Error;

/// Validation errors for dotted record paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Path cannot be empty")]
    Empty,

    #[error("Path '{path}' has an empty segment at position {index}")]
    EmptySegment {
        path: String,
        index: usize,
    },
}

/// Top-level error type for record operations.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("Cannot traverse '{path}': found {found}, expected a record")]
    TypeMismatch {
        path: String,
        found: &'static str,
    },

    #[error("Record is frozen: cannot write key '{key}'")]
    Frozen {
        key: String,
    },

    #[error("Writing key '{key}' would make the record contain itself")]
    Cycle {
        key: String,
    },

    #[error("Container rejected update: {message}")]
    Container {
        message: String,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl RecordError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates an error reported by a specialized container.
    #[must_use]
    pub fn container(message: impl Into<String>) -> Self {
        Self::Container {
            message: message.into(),
        }
    }

    /// Returns true if the path failed validation.
    #[must_use]
    pub const fn is_invalid_path(&self) -> bool {
        matches!(self, Self::InvalidPath(_))
    }

    /// Returns true if traversal hit a non-record value.
    #[must_use]
    pub const fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// Returns true if a direct write was blocked by freezing.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        matches!(self, Self::Frozen { .. })
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Result type alias for record operations.
pub type RecordResult<T> = Result<T, RecordError>;
