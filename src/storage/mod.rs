//! Document storage for bookdb
//!
//! Documents live in memory in natural (insertion) order and are persisted
//! as checksummed JSON-lines snapshots.
//!
//! # Design Principles
//!
//! - Ascending document id is natural order
//! - Index maintenance follows every storage write
//! - Checksum verified on every snapshot load; any mismatch is fatal

mod checksum;
mod collection;
mod errors;
mod snapshot;

pub use checksum::{canonical_bytes, compute_checksum, verify_checksum};
pub use collection::{Collection, DeleteOutcome, UpdateOutcome};
pub use errors::{
    CollectionError, CollectionResult, Severity, StorageError, StorageErrorCode, StorageResult,
};
pub use snapshot::{read_json_array, read_snapshot, write_snapshot, SnapshotRecord};
