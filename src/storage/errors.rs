//! Storage error types
//!
//! Error codes:
//! - BOOKDB_STORAGE_IO (ERROR severity)
//! - BOOKDB_DATA_CORRUPTION (FATAL severity)
//! - BOOKDB_DOCUMENT_INVALID (REJECT severity)

use std::fmt;
use std::io;

use thiserror::Error;

use crate::executor::ExecutorError;
use crate::query::QueryError;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
    /// Operation fails, process continues
    Error,
    /// Stored data cannot be trusted; stop
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Disk I/O failure
    StorageIo,
    /// Snapshot checksum or framing failure
    DataCorruption,
    /// Document rejected before storage
    DocumentInvalid,
}

impl StorageErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::StorageIo => "BOOKDB_STORAGE_IO",
            StorageErrorCode::DataCorruption => "BOOKDB_DATA_CORRUPTION",
            StorageErrorCode::DocumentInvalid => "BOOKDB_DOCUMENT_INVALID",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::StorageIo => Severity::Error,
            StorageErrorCode::DataCorruption => Severity::Fatal,
            StorageErrorCode::DocumentInvalid => Severity::Reject,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error type with full context
#[derive(Debug)]
pub struct StorageError {
    /// Error code
    code: StorageErrorCode,
    /// Human-readable message
    message: String,
    /// 1-based snapshot line, for corruption
    line: Option<usize>,
    /// Underlying IO error if applicable
    source: Option<io::Error>,
}

impl StorageError {
    /// Create a new storage I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::StorageIo,
            message: message.into(),
            line: None,
            source: Some(source),
        }
    }

    /// Create a new data corruption error (FATAL)
    pub fn data_corruption(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::DataCorruption,
            message: message.into(),
            line: None,
            source: None,
        }
    }

    /// Create a data corruption error at a specific snapshot line (FATAL)
    pub fn corruption_at_line(line: usize, message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::DataCorruption,
            message: format!("Line {}: {}", line, message.into()),
            line: Some(line),
            source: None,
        }
    }

    /// Create a document invalid error
    pub fn document_invalid(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::DocumentInvalid,
            message: message.into(),
            line: None,
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the snapshot line if applicable
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)?;
        if let Some(ref src) = self.source {
            write!(f, " (caused by: {})", src)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors from collection reads and writes
///
/// A find plans and executes before it touches storage, so it can fail in
/// any of the three layers.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("{0}")]
    Query(#[from] QueryError),

    #[error("{0}")]
    Executor(#[from] ExecutorError),

    #[error("{0}")]
    Storage(#[from] StorageError),
}

impl CollectionError {
    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            CollectionError::Query(e) => e.code().code(),
            CollectionError::Executor(e) => e.code().code(),
            CollectionError::Storage(e) => e.code().code(),
        }
    }
}

/// Result type for collection operations
pub type CollectionResult<T> = Result<T, CollectionError>;
