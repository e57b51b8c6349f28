//! CRC32 checksums for snapshot records
//!
//! A record's checksum covers the canonical JSON bytes of its body. Any
//! mismatch on load is treated as corruption.

use crc32fast::Hasher;
use serde_json::Value;

/// Computes a CRC32 checksum over the provided data.
///
/// This function is deterministic: the same input always produces the same output.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Verifies that the computed checksum matches the expected checksum.
pub fn verify_checksum(data: &[u8], expected: u32) -> bool {
    compute_checksum(data) == expected
}

/// Canonical bytes of a document body: compact JSON, keys sorted
pub fn canonical_bytes(body: &Value) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(body)
}
