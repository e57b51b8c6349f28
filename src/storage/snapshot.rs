//! Snapshot files
//!
//! A snapshot is one JSON object per line, in natural order:
//!
//! ```text
//! {"id":1,"checksum":2715521537,"body":{"author":"...","title":"..."}}
//! ```
//!
//! `checksum` is the CRC32 of the body's canonical bytes. Every line is
//! verified on load; a bad line, a checksum mismatch or an id that does not
//! increase is corruption and aborts the load.
//!
//! Writes go to a sibling temp file that is synced and then renamed over
//! the target, so a crash leaves either the old or the new snapshot.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::index::DocumentId;

use super::checksum::{canonical_bytes, compute_checksum, verify_checksum};
use super::errors::{StorageError, StorageResult};

/// One snapshot line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub id: DocumentId,
    pub checksum: u32,
    pub body: Value,
}

impl SnapshotRecord {
    /// Builds a record, computing the body checksum
    pub fn new(id: DocumentId, body: Value) -> StorageResult<Self> {
        let bytes = canonical_bytes(&body).map_err(|e| {
            StorageError::document_invalid(format!("Document {} cannot be encoded: {}", id, e))
        })?;
        Ok(Self {
            id,
            checksum: compute_checksum(&bytes),
            body,
        })
    }

    /// Returns true if the checksum matches the body
    pub fn verify(&self) -> bool {
        match canonical_bytes(&self.body) {
            Ok(bytes) => verify_checksum(&bytes, self.checksum),
            Err(_) => false,
        }
    }
}

/// Writes `documents` as a snapshot at `path`. Returns the record count.
pub fn write_snapshot<'a, D>(path: &Path, documents: D) -> StorageResult<usize>
where
    D: IntoIterator<Item = (DocumentId, &'a Value)>,
{
    let tmp_path = temp_path(path);
    let file = File::create(&tmp_path).map_err(|e| {
        StorageError::io_error(
            format!("Failed to create snapshot file: {}", tmp_path.display()),
            e,
        )
    })?;

    let mut writer = BufWriter::new(file);
    let mut count = 0;
    for (id, body) in documents {
        let record = SnapshotRecord::new(id, body.clone())?;
        let line = serde_json::to_string(&record).map_err(|e| {
            StorageError::document_invalid(format!("Document {} cannot be encoded: {}", id, e))
        })?;
        writeln!(writer, "{}", line)
            .map_err(|e| StorageError::io_error("Failed to write snapshot record", e))?;
        count += 1;
    }

    let file = writer
        .into_inner()
        .map_err(|e| StorageError::io_error("Failed to flush snapshot", e.into_error()))?;
    file.sync_all()
        .map_err(|e| StorageError::io_error("Failed to fsync snapshot", e))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        StorageError::io_error(
            format!("Failed to move snapshot into place: {}", path.display()),
            e,
        )
    })?;

    Ok(count)
}

/// Reads and verifies a snapshot. A missing file reads as empty.
pub fn read_snapshot(path: &Path) -> StorageResult<Vec<SnapshotRecord>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(StorageError::io_error(
                format!("Failed to open snapshot file: {}", path.display()),
                e,
            ))
        }
    };

    let mut records: Vec<SnapshotRecord> = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| StorageError::io_error("Failed to read snapshot", e))?;
        if line.trim().is_empty() {
            continue;
        }

        let record: SnapshotRecord = serde_json::from_str(&line).map_err(|e| {
            StorageError::corruption_at_line(line_no, format!("Malformed record: {}", e))
        })?;

        if !record.verify() {
            return Err(StorageError::corruption_at_line(
                line_no,
                format!("Checksum mismatch for document {}", record.id),
            ));
        }

        if let Some(prev) = records.last() {
            if record.id <= prev.id {
                return Err(StorageError::corruption_at_line(
                    line_no,
                    format!("Document id {} does not follow {}", record.id, prev.id),
                ));
            }
        }

        records.push(record);
    }

    Ok(records)
}

/// Reads a plain JSON array of documents, e.g. a seed fixture
pub fn read_json_array(path: &Path) -> StorageResult<Vec<Value>> {
    let file = File::open(path).map_err(|e| {
        StorageError::io_error(format!("Failed to open {}", path.display()), e)
    })?;
    let value: Value = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        StorageError::document_invalid(format!("{} is not valid JSON: {}", path.display(), e))
    })?;
    match value {
        Value::Array(docs) => Ok(docs),
        _ => Err(StorageError::document_invalid(format!(
            "{} must contain a JSON array",
            path.display()
        ))),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
