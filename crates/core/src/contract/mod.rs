//! Domain types a document field can hold beyond plain scalars
//!
//! - `timestamp`: nanosecond-precision point in time
//! - `blob`: opaque byte payload
//! - `geo_point`: validated latitude/longitude pair
//! - `document_ref`: path token naming another document

pub mod blob;
pub mod document_ref;
pub mod geo_point;
pub mod timestamp;

// Re-exports
pub use blob::Blob;
pub use document_ref::DocumentRef;
pub use geo_point::GeoPoint;
pub use timestamp::{Timestamp, MAX_SECONDS, MIN_SECONDS};
