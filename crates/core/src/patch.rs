//! Masked-write merge engine
//!
//! Two halves of a masked write live here:
//!
//! - [`build_patch`] runs on the caller side. It extracts exactly the masked
//!   leaves from a fully encoded document, and fails before anything is sent
//!   to storage if a masked path has no value.
//! - [`apply_patch`] is the storage-side merge-write. It overwrites exactly
//!   the masked paths of the persisted document and leaves every other field
//!   untouched.
//!
//! Path helpers ([`get_at_path`], [`set_at_path`], [`delete_at_path`]) walk
//! nested maps segment by segment.

use crate::error::{Error, Result};
use crate::field_mask::FieldMask;
use crate::field_path::FieldPath;
use crate::value::{MapValue, Value};

// =============================================================================
// Path Operations
// =============================================================================

/// Get the value at a field path
///
/// Returns `None` if any segment is absent, or an intermediate segment
/// resolves to something other than a map.
///
/// # Examples
///
/// ```
/// use docmap_core::{get_at_path, MapValue, Value};
///
/// let doc = MapValue::new().with("address", MapValue::new().with("city", "Oslo"));
/// let city = get_at_path(&doc, &"address.city".parse().unwrap());
/// assert_eq!(city, Some(&Value::from("Oslo")));
/// assert!(get_at_path(&doc, &"address.zip".parse().unwrap()).is_none());
/// ```
pub fn get_at_path<'a>(map: &'a MapValue, path: &FieldPath) -> Option<&'a Value> {
    let (last, parents) = path.segments().split_last()?;
    let mut current = map;
    for segment in parents {
        current = current.get(segment)?.as_map()?;
    }
    current.get(last)
}

/// Set the value at a field path
///
/// Creates intermediate maps as needed. An intermediate segment holding a
/// non-map value is replaced by a map, the same way writing `a.b` onto a
/// document whose `a` is a number replaces that number.
pub fn set_at_path(map: &mut MapValue, path: &FieldPath, value: Value) {
    let Some((last, parents)) = path.segments().split_last() else {
        return;
    };
    let mut current = map;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Map(MapValue::new()));
        if !slot.is_map() {
            *slot = Value::Map(MapValue::new());
        }
        let Value::Map(inner) = slot else {
            return;
        };
        current = inner;
    }
    current.insert(last.clone(), value);
}

/// Delete the value at a field path
///
/// Returns the removed value, or `None` if the path did not resolve.
/// Sibling order of the remaining fields is preserved.
pub fn delete_at_path(map: &mut MapValue, path: &FieldPath) -> Option<Value> {
    let (last, parents) = path.segments().split_last()?;
    let mut current = map;
    for segment in parents {
        current = current.get_mut(segment)?.as_map_mut()?;
    }
    current.shift_remove(last)
}

// =============================================================================
// Patch Construction
// =============================================================================

/// Build the minimal patch for a masked write
///
/// For every mask path, in declaration order, the value at that path in
/// `doc` is copied into the patch under the same nested skeleton. Fields
/// outside the mask are never copied. An empty mask yields an empty patch.
///
/// # Errors
///
/// Returns `MissingMaskedField` naming the first mask path that does not
/// resolve in `doc`.
///
/// # Examples
///
/// ```
/// use docmap_core::{build_patch, FieldMask, MapValue};
///
/// let doc = MapValue::new().with("number", 2.0).with("str", "b");
/// let patch = build_patch(&doc, &FieldMask::new(["number"]).unwrap()).unwrap();
/// assert_eq!(patch, MapValue::new().with("number", 2.0));
///
/// let err = build_patch(&doc, &FieldMask::new(["str", "missing"]).unwrap()).unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "Field 'missing' is specified in your field mask but not in your input data."
/// );
/// ```
pub fn build_patch(doc: &MapValue, mask: &FieldMask) -> Result<MapValue> {
    let mut patch = MapValue::new();
    for path in mask {
        let value =
            get_at_path(doc, path).ok_or_else(|| Error::MissingMaskedField(path.to_string()))?;
        set_at_path(&mut patch, path, value.clone());
    }
    Ok(patch)
}

/// Apply a patch to a persisted document under a mask
///
/// Every mask path present in `patch` overwrites the same path in `target`;
/// every mask path absent from `patch` is removed from `target`. Paths not
/// covered by the mask keep their persisted value.
pub fn apply_patch(target: &mut MapValue, patch: &MapValue, mask: &FieldMask) {
    for path in mask {
        match get_at_path(patch, path) {
            Some(value) => set_at_path(target, path, value.clone()),
            None => {
                delete_at_path(target, path);
            }
        }
    }
}
