//! In-memory entity store backing the entityset query seam.
//!
//! A [`MemoryStore`] holds records grouped by entity type and answers
//! select-all queries through [`entityset_core::QueryExecutor`]. Stores are
//! usually loaded from a JSON [`StoreDocument`] that declares entity types
//! and lists records, with `{"$ref": "Type#key"}` objects linking records.

pub mod document;
mod error;
mod store;

pub use document::{FieldDef, RecordDef, StoreDocument, TypeDef, parse_timestamp};
pub use error::{Result, StoreError};
pub use store::MemoryStore;
