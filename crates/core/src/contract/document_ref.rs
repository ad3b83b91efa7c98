//! Cross-document reference
//!
//! A `DocumentRef` is an opaque path token naming another document, e.g.
//! `rooms/eros/messages/1`. The only structure the mapping layer relies on
//! is the slash-delimited segment list: collection and document ids
//! alternate, so a document path always has an even number of segments.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Reference to a document by path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDocumentRef")]
pub struct DocumentRef {
    path: String,
}

#[derive(Deserialize)]
struct RawDocumentRef {
    path: String,
}

impl TryFrom<RawDocumentRef> for DocumentRef {
    type Error = Error;

    fn try_from(raw: RawDocumentRef) -> Result<Self> {
        DocumentRef::new(raw.path)
    }
}

impl DocumentRef {
    /// Parse and validate a document path
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the path is empty, has an empty
    /// segment, or has an odd number of segments.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(Error::invalid_argument("Document path must not be empty"));
        }
        let segments: Vec<&str> = path.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(Error::invalid_argument(format!(
                "Invalid document path '{}': empty segment",
                path
            )));
        }
        if segments.len() % 2 != 0 {
            return Err(Error::invalid_argument(format!(
                "Invalid document reference. Document references must have an even number of segments, but {} has {}",
                path,
                segments.len()
            )));
        }
        Ok(DocumentRef { path })
    }

    /// Build a reference from a collection path and a document id
    pub fn in_collection(collection: &str, id: &str) -> Result<Self> {
        DocumentRef::new(format!("{}/{}", collection, id))
    }

    /// The full slash-delimited path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The last segment (document id)
    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// The path of the collection containing this document
    pub fn collection_path(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[..idx],
            None => "",
        }
    }

    /// The id of the collection containing this document
    pub fn collection_id(&self) -> &str {
        let collection = self.collection_path();
        collection.rsplit('/').next().unwrap_or(collection)
    }
}

impl FromStr for DocumentRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DocumentRef::new(s)
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}
