//! Encoder: structured value -> Typed Value map

use docmap_core::{build_patch, FieldMask, MapValue, Result};

use crate::shape::{plan, Document, ShapePlan};

/// Encode a structured value into a document map
///
/// Every mapped field is read through its plan descriptor and stored under
/// its field name, in registration order. Excluded fields are never read.
///
/// # Errors
///
/// Returns `UnsupportedShape` if the shape cannot be planned.
pub fn encode<T: Document>(value: &T) -> Result<MapValue> {
    let plan = plan::<T>()?;
    encode_with_plan(value, &plan)
}

/// Encode with an already-built plan
pub fn encode_with_plan<T>(value: &T, plan: &ShapePlan<T>) -> Result<MapValue> {
    plan.fields()
        .iter()
        .map(|field| Ok((field.name().to_string(), field.read(value)?)))
        .collect()
}

/// Encode a structured value and cut the patch for a masked write
///
/// # Errors
///
/// Returns `MissingMaskedField` if a mask path does not resolve in the
/// encoded document.
pub fn patch_for<T: Document>(value: &T, mask: &FieldMask) -> Result<MapValue> {
    let doc = encode(value)?;
    build_patch(&doc, mask)
}
