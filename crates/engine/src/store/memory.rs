//! In-memory document store
//!
//! Documents live in a `DashMap` keyed by document path. A write to one
//! document holds that entry's shard lock for the whole merge, so two masked
//! writes to the same document never interleave. Nothing is persisted.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use docmap_core::{apply_patch, DocumentRef, FieldMask, MapValue, Result, Timestamp};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use super::traits::{DocumentStore, StoredDocument, WriteResult};

/// Volatile document store
///
/// # Example
///
/// ```
/// use docmap_core::{DocumentRef, MapValue};
/// use docmap_engine::{DocumentStore, InMemoryStore};
///
/// let store = InMemoryStore::new();
/// let doc: DocumentRef = "cities/oslo".parse().unwrap();
/// store.write(&doc, MapValue::new().with("name", "Oslo"), None).unwrap();
/// assert!(store.read(&doc).unwrap().is_some());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    docs: DashMap<String, StoredDocument>,
    version: AtomicU64,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Check if the store holds no documents
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Version of the most recent write (0 before any write)
    pub fn current_version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    fn next_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }
}

impl DocumentStore for InMemoryStore {
    fn write(
        &self,
        reference: &DocumentRef,
        data: MapValue,
        mask: Option<&FieldMask>,
    ) -> Result<WriteResult> {
        let entry = self.docs.entry(reference.path().to_string());
        // Version and clock are both taken under the entry lock.
        let version = self.next_version();
        let now = Timestamp::now();

        match (entry, mask) {
            (Entry::Occupied(mut occupied), Some(mask)) => {
                let doc = occupied.get_mut();
                apply_patch(&mut doc.data, &data, mask);
                doc.version = version;
                doc.update_time = now;
                debug!(path = reference.path(), version, mask = %mask, "Merged document");
            }
            (Entry::Occupied(mut occupied), None) => {
                let doc = occupied.get_mut();
                doc.data = data;
                doc.version = version;
                doc.update_time = now;
                debug!(path = reference.path(), version, "Replaced document");
            }
            (Entry::Vacant(vacant), mask) => {
                let data = match mask {
                    Some(mask) => {
                        let mut created = MapValue::new();
                        apply_patch(&mut created, &data, mask);
                        created
                    }
                    None => data,
                };
                vacant.insert(StoredDocument {
                    data,
                    version,
                    create_time: now,
                    update_time: now,
                });
                debug!(path = reference.path(), version, "Created document");
            }
        }

        Ok(WriteResult {
            version,
            update_time: now,
        })
    }

    fn read(&self, reference: &DocumentRef) -> Result<Option<StoredDocument>> {
        Ok(self.docs.get(reference.path()).map(|doc| doc.value().clone()))
    }

    fn delete(&self, reference: &DocumentRef) -> Result<bool> {
        let existed = self.docs.remove(reference.path()).is_some();
        if existed {
            debug!(path = reference.path(), "Deleted document");
        }
        Ok(existed)
    }
}
