//! The `DocumentStore` trait

use docmap_core::{DocumentRef, FieldMask, MapValue, Result, Timestamp};

/// Outcome of a successful write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteResult {
    /// Store-wide version assigned to this write
    pub version: u64,
    /// When the write was applied
    pub update_time: Timestamp,
}

/// A document as held by a store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Document fields
    pub data: MapValue,
    /// Version of the last write that touched this document
    pub version: u64,
    /// When the document was first written
    pub create_time: Timestamp,
    /// When the document was last written
    pub update_time: Timestamp,
}

/// Persistence contract for encoded documents
///
/// Implementations are responsible for making each write atomic with
/// respect to other writes of the same document. The mapping layer does
/// not sequence read-modify-write cycles.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; one store is shared by every
/// handle created from a `Documents` facade.
pub trait DocumentStore: Send + Sync {
    /// Write a document
    ///
    /// With `mask = None` the document is replaced by `data`. With a mask,
    /// `data` is a patch: every masked path present in it is set, every
    /// masked path absent from it is deleted, and nothing else changes.
    /// A masked write to a missing document creates it from the patch.
    fn write(
        &self,
        reference: &DocumentRef,
        data: MapValue,
        mask: Option<&FieldMask>,
    ) -> Result<WriteResult>;

    /// Read a document, or `None` if it does not exist
    fn read(&self, reference: &DocumentRef) -> Result<Option<StoredDocument>>;

    /// Delete a document, returning whether it existed
    fn delete(&self, reference: &DocumentRef) -> Result<bool>;
}
