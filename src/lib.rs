//! Docmap - typed document mapping with field-mask merge writes
//!
//! Docmap maps user-defined structs to nested document maps and back, and
//! turns a struct plus a field mask into the minimal patch for a merge
//! write.
//!
//! # Quick Start
//!
//! ```
//! use docmap::{Document, Documents, SetOptions, ShapeBuilder};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Reading {
//!     sensor: String,
//!     celsius: f64,
//! }
//!
//! impl Document for Reading {
//!     fn describe(shape: &mut ShapeBuilder<Self>) {
//!         shape
//!             .field("sensor", |r| &r.sensor, |r| &mut r.sensor)
//!             .field("celsius", |r| &r.celsius, |r| &mut r.celsius);
//!     }
//! }
//!
//! let docs = Documents::in_memory();
//! let doc = docs.doc("readings/r1")?;
//! doc.set(&Reading { sensor: "north".into(), celsius: 4.0 })?;
//! doc.set_with(
//!     &Reading { sensor: String::new(), celsius: 5.5 },
//!     SetOptions::merge_fields(["celsius"]),
//! )?;
//!
//! let reading: Reading = doc.get()?.to_object()?.unwrap();
//! assert_eq!(reading, Reading { sensor: "north".into(), celsius: 5.5 });
//! # Ok::<(), docmap::Error>(())
//! ```
//!
//! # Architecture
//!
//! - [`docmap_core`]: value model, field paths and masks, the merge engine
//! - [`docmap_mapper`]: shape plans, encoder and decoder
//! - [`docmap_engine`]: store contract, in-memory store, document handles

pub use docmap_core::*;
pub use docmap_engine::*;
pub use docmap_mapper::*;
