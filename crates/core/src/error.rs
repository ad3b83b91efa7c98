//! Error types for docmap
//!
//! Every failure the mapping and merge layers can produce is a variant of
//! [`Error`]. We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! None of these errors are transient: they describe a caller or programmer
//! mistake and are never retried internally.

use std::io;
use thiserror::Error;

/// Result type alias for docmap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the document mapping layer
#[derive(Debug, Error)]
pub enum Error {
    /// A shape cannot be mapped (raised while building its field plan)
    #[error("Unsupported shape {shape}: {reason}")]
    UnsupportedShape {
        /// Type name of the offending shape
        shape: String,
        /// Why the shape was rejected
        reason: String,
    },

    /// A stored value cannot convert to the declared field type
    #[error("Type mismatch at field '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Dotted path of the field being decoded
        path: String,
        /// Declared field kind
        expected: String,
        /// Stored value variant
        found: String,
    },

    /// Malformed field mask
    #[error("Invalid field mask '{path}': {reason}")]
    InvalidMask {
        /// The offending path as written by the caller
        path: String,
        /// Why the path was rejected
        reason: String,
    },

    /// A masked path has no value in the input data
    #[error("Field '{0}' is specified in your field mask but not in your input data.")]
    MissingMaskedField(String),

    /// Stored data holds a field the target shape does not declare
    #[error("No field named '{field}' on shape {shape}")]
    UnknownField {
        /// Shape being decoded
        shape: String,
        /// Dotted path of the stray field
        field: String,
    },

    /// Invalid argument (out-of-range timestamp, malformed reference, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Document not found
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (configuration files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create an `UnsupportedShape` error
    pub fn unsupported_shape(shape: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::UnsupportedShape {
            shape: shape.into(),
            reason: reason.into(),
        }
    }

    /// Create a `TypeMismatch` error
    pub fn type_mismatch(
        path: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Error::TypeMismatch {
            path: path.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an `InvalidMask` error
    pub fn invalid_mask(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidMask {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an `InvalidArgument` error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Prefix the path carried by a `TypeMismatch` or `UnknownField` with
    /// the name of the enclosing field.
    ///
    /// Used by the decoder when unwinding out of nested shapes, lists and
    /// maps so the final error names the full dotted path.
    pub fn within(self, parent: &str) -> Self {
        match self {
            Error::TypeMismatch {
                path,
                expected,
                found,
            } => Error::TypeMismatch {
                path: join_path(parent, &path),
                expected,
                found,
            },
            Error::UnknownField { shape, field } => Error::UnknownField {
                shape,
                field: join_path(parent, &field),
            },
            other => other,
        }
    }

    /// Check if this is an `UnsupportedShape` error
    pub fn is_unsupported_shape(&self) -> bool {
        matches!(self, Error::UnsupportedShape { .. })
    }

    /// Check if this is a `TypeMismatch` error
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Error::TypeMismatch { .. })
    }

    /// Check if this is an `InvalidMask` error
    pub fn is_invalid_mask(&self) -> bool {
        matches!(self, Error::InvalidMask { .. })
    }

    /// Check if this is a `MissingMaskedField` error
    pub fn is_missing_masked_field(&self) -> bool {
        matches!(self, Error::MissingMaskedField(_))
    }
}

fn join_path(parent: &str, child: &str) -> String {
    if child.is_empty() {
        parent.to_string()
    } else if child.starts_with('[') {
        format!("{}{}", parent, child)
    } else {
        format!("{}.{}", parent, child)
    }
}
