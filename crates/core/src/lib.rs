//! Core types for docmap
//!
//! This crate defines the foundational types used throughout the system:
//! - Value / MapValue: typed value model for document fields
//! - Contract types: Timestamp, Blob, GeoPoint, DocumentRef
//! - FieldPath / FieldMask: dot-delimited field addressing for masked writes
//! - Patch: masked-write merge engine (`build_patch`, `apply_patch`)
//! - Error: error taxonomy shared by every crate
//! - Limits: document depth and path length limits

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod contract;
pub mod error;
pub mod field_mask;
pub mod field_path;
pub mod limits;
pub mod patch;
pub mod value;

// Re-export commonly used types
pub use contract::{Blob, DocumentRef, GeoPoint, Timestamp};
pub use error::{Error, Result};
pub use field_mask::FieldMask;
pub use field_path::{FieldPath, FIELD_PATH_SEPARATOR};
pub use limits::{MAX_FIELD_PATH_SEGMENTS, MAX_NESTING_DEPTH};
pub use patch::{apply_patch, build_patch, delete_at_path, get_at_path, set_at_path};
pub use value::{MapValue, Value};
