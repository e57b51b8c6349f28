//! Index subsystem for bookdb
//!
//! Indexes are derived, in-memory state built from the stored documents.
//!
//! # Design Principles
//!
//! - Derived state: indexes mirror storage, never the source of truth
//! - Ascending only: single-field and compound indexes over scalar values
//! - Deterministic: BTreeMap iteration order, ids sorted ascending
//!
//! # Invariants
//!
//! - Index maintenance happens AFTER the storage write
//! - Lookups return ids in natural (insertion) order

mod btree;
mod errors;
mod manager;
mod spec;

pub use btree::{DocumentId, IndexKey, IndexTree};
pub use errors::{IndexError, IndexErrorCode, IndexResult};
pub use manager::{IndexManager, IndexMetadata};
pub use spec::{IndexField, IndexSpec};
