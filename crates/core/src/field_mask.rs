//! Field masks restricting a write to named fields
//!
//! A `FieldMask` is an ordered set of [`FieldPath`]s. Declaration order is
//! kept so that validation reports problems in the order the caller wrote
//! them; matching itself is order independent.
//!
//! ## Overlapping paths
//!
//! A mask that contains both a path and a longer path nested under it
//! (`address` and `address.city`) is rejected with `InvalidMask`. Writing
//! `address` already replaces everything below it, so the longer path could
//! only ever be redundant or contradictory.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::field_path::FieldPath;
use crate::value::{MapValue, Value};

/// Ordered set of field paths
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFieldMask")]
pub struct FieldMask {
    paths: Vec<FieldPath>,
}

#[derive(Deserialize)]
struct RawFieldMask {
    paths: Vec<FieldPath>,
}

impl TryFrom<RawFieldMask> for FieldMask {
    type Error = Error;

    fn try_from(raw: RawFieldMask) -> Result<Self> {
        FieldMask::from_paths(raw.paths)
    }
}

impl FieldMask {
    /// The empty mask (a masked write with it changes nothing)
    pub fn empty() -> Self {
        FieldMask { paths: Vec::new() }
    }

    /// Build a mask from dot-delimited path strings
    ///
    /// Exact duplicates collapse to their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMask` if any path is empty, has an empty segment, or
    /// is a strict prefix of another path in the mask.
    ///
    /// # Examples
    ///
    /// ```
    /// use docmap_core::FieldMask;
    ///
    /// let mask = FieldMask::new(["str", "missing"]).unwrap();
    /// assert_eq!(mask.len(), 2);
    /// assert!(FieldMask::new(["address", "address.city"]).is_err());
    /// ```
    pub fn new<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = paths
            .into_iter()
            .map(|p| p.as_ref().parse::<FieldPath>())
            .collect::<Result<Vec<_>>>()?;
        FieldMask::from_paths(parsed)
    }

    /// Build a mask from already-parsed paths
    pub fn from_paths(paths: impl IntoIterator<Item = FieldPath>) -> Result<Self> {
        let mut mask = FieldMask::empty();
        for path in paths {
            if mask.paths.contains(&path) {
                continue;
            }
            if let Some(other) = mask
                .paths
                .iter()
                .find(|p| p.is_strict_prefix_of(&path) || path.is_strict_prefix_of(p))
            {
                return Err(Error::invalid_mask(
                    path.to_string(),
                    format!("overlaps with field path '{}' in the same mask", other),
                ));
            }
            mask.paths.push(path);
        }
        Ok(mask)
    }

    /// Mask of every leaf path in `data`
    ///
    /// Non-map values and empty maps are leaves; non-empty maps are
    /// descended into. This is the mask of a "merge everything" write.
    pub fn from_leaves(data: &MapValue) -> Self {
        fn collect(map: &MapValue, prefix: &[String], out: &mut Vec<FieldPath>) {
            for (key, value) in map.iter() {
                let mut segments = prefix.to_vec();
                segments.push(key.clone());
                match value {
                    Value::Map(inner) if !inner.is_empty() => collect(inner, &segments, out),
                    _ => out.push(FieldPath::from_segments_unchecked(segments)),
                }
            }
        }

        let mut paths = Vec::new();
        collect(data, &[], &mut paths);
        // Leaf paths of a tree never prefix one another, and map keys are unique.
        FieldMask { paths }
    }

    /// The paths in declaration order
    pub fn paths(&self) -> &[FieldPath] {
        &self.paths
    }

    /// Iterate over the paths in declaration order
    pub fn iter(&self) -> std::slice::Iter<'_, FieldPath> {
        self.paths.iter()
    }

    /// Number of paths
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if the mask has no paths
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Check if the mask names exactly this path
    pub fn contains(&self, path: &FieldPath) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Check if some mask path is a strict prefix of `path`
    pub fn is_prefix_of(&self, path: &FieldPath) -> bool {
        self.paths.iter().any(|p| p.is_strict_prefix_of(path))
    }

    /// Check if a write under this mask touches `path`
    ///
    /// True when some mask path equals `path` or is a prefix of it.
    pub fn covers(&self, path: &FieldPath) -> bool {
        self.paths.iter().any(|p| p.is_prefix_of(path))
    }
}

impl<'a> IntoIterator for &'a FieldMask {
    type Item = &'a FieldPath;
    type IntoIter = std::slice::Iter<'a, FieldPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

impl fmt::Display for FieldMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, p) in self.paths.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, "}}")
    }
}
