//! Write options for `DocumentHandle::set_with`

use docmap_core::{FieldMask, FieldPath, MapValue, Result};

/// How a write combines with the stored document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SetOptions {
    /// Replace the whole document
    #[default]
    Overwrite,
    /// Merge every leaf field of the written data
    Merge,
    /// Merge only the named dot-delimited fields
    MergeFields(Vec<String>),
    /// Merge only the given field paths
    MergeFieldPaths(Vec<FieldPath>),
}

impl SetOptions {
    /// Merge every leaf field of the written data
    pub fn merge() -> Self {
        SetOptions::Merge
    }

    /// Merge only the named fields
    ///
    /// ```
    /// use docmap_engine::SetOptions;
    ///
    /// let options = SetOptions::merge_fields(["number", "address.city"]);
    /// assert!(options.is_merge());
    /// ```
    pub fn merge_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SetOptions::MergeFields(fields.into_iter().map(Into::into).collect())
    }

    /// Merge only the given field paths
    pub fn merge_field_paths(paths: impl IntoIterator<Item = FieldPath>) -> Self {
        SetOptions::MergeFieldPaths(paths.into_iter().collect())
    }

    /// Check if the write is a merge
    pub fn is_merge(&self) -> bool {
        !matches!(self, SetOptions::Overwrite)
    }

    /// Field mask this write applies to `data`, or `None` for an overwrite
    ///
    /// # Errors
    ///
    /// Returns `InvalidMask` if a named field is malformed or two fields
    /// overlap.
    pub fn mask_for(&self, data: &MapValue) -> Result<Option<FieldMask>> {
        match self {
            SetOptions::Overwrite => Ok(None),
            SetOptions::Merge => Ok(Some(FieldMask::from_leaves(data))),
            SetOptions::MergeFields(fields) => FieldMask::new(fields).map(Some),
            SetOptions::MergeFieldPaths(paths) => {
                FieldMask::from_paths(paths.iter().cloned()).map(Some)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> MapValue {
        MapValue::new()
            .with("a", 1i64)
            .with("b", MapValue::new().with("c", true))
    }

    #[test]
    fn test_overwrite_has_no_mask() {
        assert_eq!(SetOptions::default().mask_for(&data()).unwrap(), None);
        assert!(!SetOptions::Overwrite.is_merge());
    }

    #[test]
    fn test_merge_masks_every_leaf() {
        let mask = SetOptions::merge().mask_for(&data()).unwrap().unwrap();
        assert_eq!(mask.to_string(), "{a, b.c}");
    }

    #[test]
    fn test_merge_fields() {
        let mask = SetOptions::merge_fields(["b.c"])
            .mask_for(&data())
            .unwrap()
            .unwrap();
        assert_eq!(mask.len(), 1);
        assert!(mask.contains(&"b.c".parse().unwrap()));
    }

    #[test]
    fn test_merge_fields_rejects_bad_path() {
        let err = SetOptions::merge_fields(["a..b"])
            .mask_for(&data())
            .unwrap_err();
        assert!(err.is_invalid_mask());
    }

    #[test]
    fn test_merge_field_paths_rejects_overlap() {
        let err = SetOptions::merge_field_paths([
            "b".parse::<FieldPath>().unwrap(),
            "b.c".parse::<FieldPath>().unwrap(),
        ])
        .mask_for(&data())
        .unwrap_err();
        assert!(err.is_invalid_mask());
    }
}
