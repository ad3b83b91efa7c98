//! Dot-delimited paths to document fields
//!
//! A `FieldPath` names one field inside a (possibly nested) document:
//! `number`, `address.city`. Unlike a document path it never names the root,
//! so it always has at least one segment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::limits::MAX_FIELD_PATH_SEGMENTS;

/// Separator between field path segments
pub const FIELD_PATH_SEPARATOR: char = '.';

/// Path to a field inside a document
///
/// # Examples
///
/// ```
/// use docmap_core::FieldPath;
///
/// let city: FieldPath = "address.city".parse().unwrap();
/// let address: FieldPath = "address".parse().unwrap();
/// assert!(address.is_prefix_of(&city));
/// assert_eq!(city.segments(), &["address", "city"]);
/// assert!("address..city".parse::<FieldPath>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Create a path from pre-split segments
    ///
    /// # Errors
    ///
    /// Returns `InvalidMask` if there are no segments or any segment is empty.
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        let display = segments.join(".");
        if segments.is_empty() {
            return Err(Error::invalid_mask(display, "field path must not be empty"));
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(Error::invalid_mask(
                display,
                "field path must not contain empty segments",
            ));
        }
        if segments.len() > MAX_FIELD_PATH_SEGMENTS {
            return Err(Error::invalid_mask(
                display,
                format!(
                    "field path length {} exceeds maximum of {} segments",
                    segments.len(),
                    MAX_FIELD_PATH_SEGMENTS
                ),
            ));
        }
        Ok(FieldPath { segments })
    }

    /// Wrap segments already known to be non-empty
    pub(crate) fn from_segments_unchecked(segments: Vec<String>) -> Self {
        debug_assert!(!segments.is_empty());
        FieldPath { segments }
    }

    /// Path consisting of a single field name
    pub fn single(name: impl Into<String>) -> Result<Self> {
        FieldPath::from_segments([name.into()])
    }

    /// Get the path segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments (always at least 1)
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; kept for API symmetry with collections
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First segment (top-level field name)
    pub fn first_segment(&self) -> &str {
        &self.segments[0]
    }

    /// Last segment (leaf field name)
    pub fn last_segment(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Append a segment (builder pattern)
    pub fn child(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Parent path, or None for a top-level field
    pub fn parent(&self) -> Option<FieldPath> {
        if self.segments.len() <= 1 {
            None
        } else {
            Some(FieldPath {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        }
    }

    /// Check if this path is a prefix of another (or equal)
    ///
    /// Comparison is exact and segment-wise: `a.b` is a prefix of `a.b.c`
    /// but not of `a.bc`.
    pub fn is_prefix_of(&self, other: &FieldPath) -> bool {
        self.segments.len() <= other.segments.len()
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a == b)
    }

    /// Check if this path is a proper prefix of another (not equal)
    pub fn is_strict_prefix_of(&self, other: &FieldPath) -> bool {
        self.segments.len() < other.segments.len() && self.is_prefix_of(other)
    }

    /// Dot-joined string form
    pub fn to_path_string(&self) -> String {
        self.segments.join(".")
    }
}

impl FromStr for FieldPath {
    type Err = Error;

    /// Parse a dot-delimited path: `number`, `address.city`
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::invalid_mask(s, "field path must not be empty"));
        }
        FieldPath::from_segments(s.split(FIELD_PATH_SEPARATOR))
    }
}

impl TryFrom<String> for FieldPath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_path_string()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path_string())
    }
}
