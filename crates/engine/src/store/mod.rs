//! Storage collaborator contract and the in-memory implementation
//!
//! The mapping layer never persists anything itself. It hands encoded
//! documents, optionally restricted by a field mask, to a [`DocumentStore`]:
//!
//! - **Full write** (`mask = None`): the stored document becomes exactly
//!   the supplied map.
//! - **Masked write** (`mask = Some`): the supplied map is a patch; only
//!   the masked paths of the stored document change.

mod memory;
mod traits;

pub use memory::InMemoryStore;
pub use traits::{DocumentStore, StoredDocument, WriteResult};
