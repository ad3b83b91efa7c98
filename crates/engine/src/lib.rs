//! Document access engine for docmap
//!
//! This crate connects the mapping layer to storage:
//! - Store: the `DocumentStore` contract and an in-memory implementation
//! - Documents: collection/document handles that encode, validate and write
//! - SetOptions: overwrite vs. merge writes
//! - DocumentSnapshot: read results with typed decoding
//! - Config: `docmap.toml` settings
//!
//! The engine is the only component that talks to a store. Everything a
//! write can fail on (shape, mask, missing masked field, depth) is checked
//! here before the store is called.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod documents;
pub mod options;
pub mod snapshot;
pub mod store;

pub use config::{DocmapConfig, CONFIG_FILE_NAME};
pub use documents::{CollectionRef, DocumentHandle, Documents};
pub use options::SetOptions;
pub use snapshot::DocumentSnapshot;
pub use store::{DocumentStore, InMemoryStore, StoredDocument, WriteResult};
