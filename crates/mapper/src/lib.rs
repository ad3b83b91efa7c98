//! Structured value <-> document mapping for docmap
//!
//! This crate turns user-defined structs into document maps and back:
//! - Field: `FieldValue` conversions between native types and `Value`
//! - Shape: the `Document` trait, `ShapeBuilder`, cached `ShapePlan`s
//! - Encode: struct -> `MapValue`, and masked patches via `patch_for`
//! - Decode: `MapValue` -> struct with per-field coercion

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decode;
pub mod encode;
pub mod field;
pub mod shape;

pub use decode::{decode, decode_with, decode_with_plan, DecodeOptions, UnknownFieldPolicy};
pub use encode::{encode, encode_with_plan, patch_for};
pub use field::{FieldKind, FieldValue};
pub use shape::{plan, Document, ExcludedField, FieldDescriptor, ShapeBuilder, ShapePlan};
