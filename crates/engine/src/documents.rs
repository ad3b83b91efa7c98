//! Documents: typed facade over a `DocumentStore`
//!
//! ## Design: STATELESS FACADE
//!
//! `Documents` holds only the shared store and the config. Collection and
//! document handles are cheap clones of it plus a path; none of them cache
//! document data.
//!
//! ## Write Path
//!
//! ```text
//! set_with(value, options):
//!   1. Encode value through its cached field plan
//!   2. Check nesting depth against the config
//!   3. Derive the field mask from SetOptions (InvalidMask fails here)
//!   4. Cut the patch (MissingMaskedField fails here)
//!   5. DocumentStore::write
//! ```
//!
//! Every validation failure happens before step 5, so a rejected write never
//! reaches the store.

use docmap_core::{build_patch, DocumentRef, Error, MapValue, Result};
use docmap_mapper::{encode, Document};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::config::DocmapConfig;
use crate::options::SetOptions;
use crate::snapshot::DocumentSnapshot;
use crate::store::{DocumentStore, InMemoryStore, WriteResult};

/// Entry point for reading and writing structured values as documents
///
/// # Example
///
/// ```
/// use docmap_engine::{Documents, SetOptions};
/// use docmap_mapper::{Document, ShapeBuilder};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct City {
///     name: String,
///     population: i64,
/// }
///
/// impl Document for City {
///     fn describe(shape: &mut ShapeBuilder<Self>) {
///         shape
///             .field("name", |c| &c.name, |c| &mut c.name)
///             .field("population", |c| &c.population, |c| &mut c.population);
///     }
/// }
///
/// let docs = Documents::in_memory();
/// let oslo = docs.doc("cities/oslo").unwrap();
/// oslo.set(&City { name: "Oslo".into(), population: 700_000 }).unwrap();
/// oslo.set_with(
///     &City { name: "ignored".into(), population: 710_000 },
///     SetOptions::merge_fields(["population"]),
/// )
/// .unwrap();
///
/// let city: City = oslo.get().unwrap().to_object().unwrap().unwrap();
/// assert_eq!(city, City { name: "Oslo".into(), population: 710_000 });
/// ```
#[derive(Clone)]
pub struct Documents {
    store: Arc<dyn DocumentStore>,
    config: Arc<DocmapConfig>,
}

impl Documents {
    /// Facade over a store with the default config
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Documents {
            store,
            config: Arc::new(DocmapConfig::default()),
        }
    }

    /// Facade over a store with an explicit config
    ///
    /// # Errors
    ///
    /// Returns `Config` if the config fails [`DocmapConfig::validate`].
    pub fn with_config(store: Arc<dyn DocumentStore>, config: DocmapConfig) -> Result<Self> {
        config.validate()?;
        Ok(Documents {
            store,
            config: Arc::new(config),
        })
    }

    /// Facade over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }

    /// The active config
    pub fn config(&self) -> &DocmapConfig {
        &self.config
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Handle to a collection by slash-delimited path (`cities`, `a/b/c`)
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the path is empty, has an empty
    /// segment, or names a document (even segment count).
    pub fn collection(&self, path: &str) -> Result<CollectionRef> {
        CollectionRef::new(self.clone(), path)
    }

    /// Handle to a document by slash-delimited path (`cities/oslo`)
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the path is not a valid document path.
    pub fn doc(&self, path: &str) -> Result<DocumentHandle> {
        Ok(DocumentHandle {
            docs: self.clone(),
            reference: DocumentRef::new(path)?,
        })
    }

    fn write(
        &self,
        reference: &DocumentRef,
        data: MapValue,
        options: &SetOptions,
    ) -> Result<WriteResult> {
        data.validate_depth(self.config.max_nesting_depth)?;
        let result = match options.mask_for(&data)? {
            Some(mask) => {
                let patch = build_patch(&data, &mask)?;
                debug!(path = reference.path(), mask = %mask, "Masked write");
                self.store.write(reference, patch, Some(&mask))?
            }
            None => {
                debug!(path = reference.path(), fields = data.len(), "Full write");
                self.store.write(reference, data, None)?
            }
        };
        Ok(result)
    }

    fn read(&self, reference: &DocumentRef) -> Result<DocumentSnapshot> {
        let stored = self.store.read(reference)?;
        Ok(DocumentSnapshot::new(
            reference.clone(),
            stored,
            self.config.decode_options(),
        ))
    }
}

impl fmt::Debug for Documents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Documents")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// CollectionRef
// =============================================================================

/// Handle to a collection of documents
#[derive(Debug, Clone)]
pub struct CollectionRef {
    docs: Documents,
    path: String,
}

impl CollectionRef {
    fn new(docs: Documents, path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::invalid_argument("Collection path must not be empty"));
        }
        let segments = path.split('/').collect::<Vec<_>>();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(Error::invalid_argument(format!(
                "Invalid collection path '{}': empty segment",
                path
            )));
        }
        if segments.len() % 2 == 0 {
            return Err(Error::invalid_argument(format!(
                "Invalid collection reference. Collection references must have an odd number of segments, but {} has {}",
                path,
                segments.len()
            )));
        }
        Ok(CollectionRef {
            docs,
            path: path.to_string(),
        })
    }

    /// Slash-delimited collection path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Collection id (last path segment)
    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Handle to a document in this collection
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `id` is empty or contains `/`.
    pub fn doc(&self, id: &str) -> Result<DocumentHandle> {
        if id.contains('/') {
            return Err(Error::invalid_argument(format!(
                "Document id '{}' must not contain '/'",
                id
            )));
        }
        Ok(DocumentHandle {
            docs: self.docs.clone(),
            reference: DocumentRef::in_collection(&self.path, id)?,
        })
    }

    /// Handle to a document with a fresh random id
    pub fn new_doc(&self) -> Result<DocumentHandle> {
        self.doc(&Uuid::new_v4().simple().to_string())
    }

    /// Write a structured value under a fresh random id
    pub fn add<T: Document>(&self, value: &T) -> Result<DocumentHandle> {
        let handle = self.new_doc()?;
        handle.set(value)?;
        Ok(handle)
    }
}

// =============================================================================
// DocumentHandle
// =============================================================================

/// Handle to one document
#[derive(Debug, Clone)]
pub struct DocumentHandle {
    docs: Documents,
    reference: DocumentRef,
}

impl DocumentHandle {
    /// Reference of this document
    pub fn reference(&self) -> &DocumentRef {
        &self.reference
    }

    /// Document id (last path segment)
    pub fn id(&self) -> &str {
        self.reference.id()
    }

    /// Slash-delimited document path
    pub fn path(&self) -> &str {
        self.reference.path()
    }

    /// Handle to a subcollection of this document
    pub fn collection(&self, id: &str) -> Result<CollectionRef> {
        CollectionRef::new(
            self.docs.clone(),
            &format!("{}/{}", self.reference.path(), id),
        )
    }

    /// Replace the document with an encoded structured value
    pub fn set<T: Document>(&self, value: &T) -> Result<WriteResult> {
        self.set_with(value, SetOptions::Overwrite)
    }

    /// Write an encoded structured value with explicit options
    ///
    /// # Errors
    ///
    /// - `UnsupportedShape` if `T` cannot be planned
    /// - `InvalidMask` if the merge fields are malformed
    /// - `MissingMaskedField` if a merge field has no value in the encoded
    ///   document
    /// - `InvalidArgument` if the document nests too deeply
    ///
    /// The store is not called when any of these fail.
    pub fn set_with<T: Document>(&self, value: &T, options: SetOptions) -> Result<WriteResult> {
        let data = encode(value)?;
        self.docs.write(&self.reference, data, &options)
    }

    /// Write a raw document map with explicit options
    pub fn set_value(&self, data: MapValue, options: SetOptions) -> Result<WriteResult> {
        self.docs.write(&self.reference, data, &options)
    }

    /// Read the document
    pub fn get(&self) -> Result<DocumentSnapshot> {
        self.docs.read(&self.reference)
    }

    /// Delete the document, returning whether it existed
    pub fn delete(&self) -> Result<bool> {
        self.docs.store.delete(&self.reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmap_core::Value;
    use docmap_mapper::ShapeBuilder;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Note {
        title: String,
        body: String,
        stars: i64,
    }

    impl Document for Note {
        fn describe(shape: &mut ShapeBuilder<Self>) {
            shape
                .field("title", |n| &n.title, |n| &mut n.title)
                .field("body", |n| &n.body, |n| &mut n.body)
                .field("stars", |n| &n.stars, |n| &mut n.stars);
        }
    }

    fn note(title: &str, body: &str, stars: i64) -> Note {
        Note {
            title: title.to_string(),
            body: body.to_string(),
            stars,
        }
    }

    #[test]
    fn test_collection_path_validation() {
        let docs = Documents::in_memory();
        assert!(docs.collection("notes").is_ok());
        assert!(docs.collection("users/u1/notes").is_ok());
        assert!(docs.collection("").is_err());
        assert!(docs.collection("users/u1").is_err());
        assert!(docs.collection("users//notes").is_err());
    }

    #[test]
    fn test_doc_path_validation() {
        let docs = Documents::in_memory();
        assert!(docs.doc("notes/n1").is_ok());
        assert!(docs.doc("notes").is_err());
        assert!(docs.collection("notes").unwrap().doc("a/b").is_err());
    }

    #[test]
    fn test_set_then_get() {
        let docs = Documents::in_memory();
        let handle = docs.doc("notes/n1").unwrap();
        handle.set(&note("t", "b", 3)).unwrap();

        let snapshot = handle.get().unwrap();
        assert!(snapshot.exists());
        assert_eq!(snapshot.to_object::<Note>().unwrap(), Some(note("t", "b", 3)));
    }

    #[test]
    fn test_get_missing() {
        let docs = Documents::in_memory();
        let snapshot = docs.doc("notes/none").unwrap().get().unwrap();
        assert!(!snapshot.exists());
        assert_eq!(snapshot.to_object::<Note>().unwrap(), None);
    }

    #[test]
    fn test_merge_fields_preserves_others() {
        let docs = Documents::in_memory();
        let handle = docs.doc("notes/n1").unwrap();
        handle.set(&note("t", "b", 3)).unwrap();
        handle
            .set_with(&note("x", "y", 5), SetOptions::merge_fields(["stars"]))
            .unwrap();

        let back: Note = handle.get().unwrap().to_object().unwrap().unwrap();
        assert_eq!(back, note("t", "b", 5));
    }

    #[test]
    fn test_merge_all_leaves_keeps_unwritten_fields() {
        let docs = Documents::in_memory();
        let handle = docs.doc("notes/n1").unwrap();
        handle
            .set_value(
                MapValue::new().with("title", "t").with("extra", true),
                SetOptions::Overwrite,
            )
            .unwrap();
        handle
            .set_value(MapValue::new().with("title", "u"), SetOptions::merge())
            .unwrap();

        let snapshot = handle.get().unwrap();
        assert_eq!(snapshot.get("title").unwrap(), Some(&Value::from("u")));
        assert_eq!(snapshot.get("extra").unwrap(), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_add_assigns_random_ids() {
        let docs = Documents::in_memory();
        let notes = docs.collection("notes").unwrap();
        let a = notes.add(&note("a", "", 0)).unwrap();
        let b = notes.add(&note("b", "", 0)).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id().len(), 32);
        assert_eq!(a.reference().collection_id(), "notes");
    }

    #[test]
    fn test_subcollection() {
        let docs = Documents::in_memory();
        let replies = docs.doc("notes/n1").unwrap().collection("replies").unwrap();
        assert_eq!(replies.path(), "notes/n1/replies");
        assert_eq!(replies.id(), "replies");
        assert_eq!(replies.doc("r1").unwrap().path(), "notes/n1/replies/r1");
    }

    #[test]
    fn test_delete() {
        let docs = Documents::in_memory();
        let handle = docs.doc("notes/n1").unwrap();
        handle.set(&note("t", "b", 3)).unwrap();
        assert!(handle.delete().unwrap());
        assert!(!handle.get().unwrap().exists());
    }

    #[test]
    fn test_with_config_rejects_zero_depth() {
        let config = DocmapConfig {
            max_nesting_depth: 0,
            ..DocmapConfig::default()
        };
        let err = Documents::with_config(Arc::new(InMemoryStore::new()), config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_depth_limit_from_config() {
        let config = DocmapConfig {
            max_nesting_depth: 2,
            ..DocmapConfig::default()
        };
        let docs = Documents::with_config(Arc::new(InMemoryStore::new()), config).unwrap();
        let handle = docs.doc("deep/d").unwrap();

        let ok = MapValue::new().with("a", MapValue::new().with("b", 1i64));
        assert!(handle.set_value(ok, SetOptions::Overwrite).is_ok());

        let too_deep = MapValue::new().with(
            "a",
            MapValue::new().with("b", MapValue::new().with("c", 1i64)),
        );
        let err = handle.set_value(too_deep, SetOptions::Overwrite).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_missing_masked_field_leaves_store_untouched() {
        let store = Arc::new(InMemoryStore::new());
        let docs = Documents::new(store.clone());
        let handle = docs.doc("notes/n1").unwrap();
        handle.set(&note("t", "b", 3)).unwrap();
        let version = store.current_version();

        let err = handle
            .set_with(&note("x", "y", 5), SetOptions::merge_fields(["title", "missing"]))
            .unwrap_err();
        assert!(err.is_missing_masked_field());
        assert_eq!(store.current_version(), version);
    }

    #[test]
    fn test_empty_merge_fields_changes_nothing() {
        let docs = Documents::in_memory();
        let handle = docs.doc("notes/n1").unwrap();
        handle.set(&note("t", "b", 3)).unwrap();
        let before = handle.get().unwrap();

        handle
            .set_with(&note("x", "y", 5), SetOptions::MergeFields(Vec::new()))
            .unwrap();
        let after = handle.get().unwrap();
        assert_eq!(after.data(), before.data());
        assert!(after.version() > before.version());
    }

    #[test]
    fn test_merge_onto_missing_document_stores_patch_only() {
        let store = Arc::new(InMemoryStore::new());
        let docs = Documents::new(store.clone());
        let handle = docs.doc("notes/n1").unwrap();
        handle
            .set_with(&note("x", "y", 5), SetOptions::merge_fields(["stars"]))
            .unwrap();

        // A masked write to a missing document creates it from the patch alone.
        let stored = store.read(handle.reference()).unwrap().unwrap();
        assert_eq!(stored.data, MapValue::new().with("stars", 5i64));
    }
}
