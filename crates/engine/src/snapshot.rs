//! Read results

use docmap_core::{get_at_path, DocumentRef, FieldPath, MapValue, Result, Timestamp, Value};
use docmap_mapper::{decode_with, DecodeOptions, Document};

use crate::store::StoredDocument;

/// A document as read at one point in time
///
/// A snapshot of a missing document exists too: `exists()` is false and
/// every accessor returns `None`.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    reference: DocumentRef,
    stored: Option<StoredDocument>,
    decode_options: DecodeOptions,
}

impl DocumentSnapshot {
    pub(crate) fn new(
        reference: DocumentRef,
        stored: Option<StoredDocument>,
        decode_options: DecodeOptions,
    ) -> Self {
        DocumentSnapshot {
            reference,
            stored,
            decode_options,
        }
    }

    /// Reference of the document that was read
    pub fn reference(&self) -> &DocumentRef {
        &self.reference
    }

    /// Document id (last path segment)
    pub fn id(&self) -> &str {
        self.reference.id()
    }

    /// Check if the document existed when read
    pub fn exists(&self) -> bool {
        self.stored.is_some()
    }

    /// All fields of the document
    pub fn data(&self) -> Option<&MapValue> {
        self.stored.as_ref().map(|doc| &doc.data)
    }

    /// Value at a dot-delimited field path
    ///
    /// # Errors
    ///
    /// Returns `InvalidMask` if `path` is not a valid field path.
    pub fn get(&self, path: &str) -> Result<Option<&Value>> {
        let path: FieldPath = path.parse()?;
        Ok(self.data().and_then(|data| get_at_path(data, &path)))
    }

    /// Version of the last write to the document
    pub fn version(&self) -> Option<u64> {
        self.stored.as_ref().map(|doc| doc.version)
    }

    /// When the document was created
    pub fn create_time(&self) -> Option<Timestamp> {
        self.stored.as_ref().map(|doc| doc.create_time)
    }

    /// When the document was last written
    pub fn update_time(&self) -> Option<Timestamp> {
        self.stored.as_ref().map(|doc| doc.update_time)
    }

    /// Decode the document into a structured value
    ///
    /// Returns `Ok(None)` for a missing document.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` or `UnknownField` (under the reject policy) if
    /// the stored fields do not fit `T`, and `UnsupportedShape` if `T` cannot
    /// be planned.
    pub fn to_object<T: Document>(&self) -> Result<Option<T>> {
        self.data()
            .map(|data| decode_with(data, &self.decode_options))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmap_mapper::ShapeBuilder;

    #[derive(Debug, Default, PartialEq)]
    struct Point {
        x: i64,
    }

    impl Document for Point {
        fn describe(shape: &mut ShapeBuilder<Self>) {
            shape.field("x", |p| &p.x, |p| &mut p.x);
        }
    }

    fn reference() -> DocumentRef {
        "points/p1".parse().unwrap()
    }

    fn stored(data: MapValue) -> StoredDocument {
        let at = Timestamp::new(10, 0).unwrap();
        StoredDocument {
            data,
            version: 3,
            create_time: at,
            update_time: at,
        }
    }

    #[test]
    fn test_missing_snapshot() {
        let snapshot = DocumentSnapshot::new(reference(), None, DecodeOptions::default());
        assert!(!snapshot.exists());
        assert!(snapshot.data().is_none());
        assert_eq!(snapshot.version(), None);
        assert_eq!(snapshot.get("x").unwrap(), None);
        assert_eq!(snapshot.to_object::<Point>().unwrap(), None);
    }

    #[test]
    fn test_existing_snapshot() {
        let snapshot = DocumentSnapshot::new(
            reference(),
            Some(stored(MapValue::new().with("x", 4i64))),
            DecodeOptions::default(),
        );
        assert!(snapshot.exists());
        assert_eq!(snapshot.id(), "p1");
        assert_eq!(snapshot.version(), Some(3));
        assert_eq!(snapshot.get("x").unwrap(), Some(&Value::Int(4)));
        assert_eq!(snapshot.to_object::<Point>().unwrap(), Some(Point { x: 4 }));
    }

    #[test]
    fn test_get_nested_path() {
        let snapshot = DocumentSnapshot::new(
            reference(),
            Some(stored(
                MapValue::new().with("a", MapValue::new().with("b", "deep")),
            )),
            DecodeOptions::default(),
        );
        assert_eq!(snapshot.get("a.b").unwrap(), Some(&Value::from("deep")));
        assert!(snapshot.get("a..b").unwrap_err().is_invalid_mask());
    }

    #[test]
    fn test_to_object_type_mismatch() {
        let snapshot = DocumentSnapshot::new(
            reference(),
            Some(stored(MapValue::new().with("x", "four"))),
            DecodeOptions::default(),
        );
        assert!(snapshot.to_object::<Point>().unwrap_err().is_type_mismatch());
    }
}
