//! Executor error types
//!
//! Error codes:
//! - BOOKDB_EXECUTION_FAILED (ERROR)
//! - BOOKDB_DATA_CORRUPTION (FATAL)

use std::fmt;

use crate::index::DocumentId;

/// Severity levels for executor errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation failed but the collection is healthy
    Error,
    /// Collection state is inconsistent
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Executor-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// General execution failure
    ExecutionFailed,
    /// Index points at a document storage does not hold
    DataCorruption,
}

impl ExecutorErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::ExecutionFailed => "BOOKDB_EXECUTION_FAILED",
            ExecutorErrorCode::DataCorruption => "BOOKDB_DATA_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            ExecutorErrorCode::DataCorruption => Severity::Fatal,
            ExecutorErrorCode::ExecutionFailed => Severity::Error,
        }
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Executor error type with full context
#[derive(Debug)]
pub struct ExecutorError {
    code: ExecutorErrorCode,
    message: String,
    document_id: Option<DocumentId>,
}

impl ExecutorError {
    /// Create an execution failed error
    pub fn execution_failed(reason: impl Into<String>) -> Self {
        Self {
            code: ExecutorErrorCode::ExecutionFailed,
            message: reason.into(),
            document_id: None,
        }
    }

    /// Create a data corruption error (FATAL)
    pub fn data_corruption(id: DocumentId, reason: impl Into<String>) -> Self {
        Self {
            code: ExecutorErrorCode::DataCorruption,
            message: format!("Document {}: {}", id, reason.into()),
            document_id: Some(id),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ExecutorErrorCode {
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

    /// Returns the offending document id, if any
    pub fn document_id(&self) -> Option<DocumentId> {
        self.document_id
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for ExecutorError {}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ExecutorErrorCode::ExecutionFailed.code(),
            "BOOKDB_EXECUTION_FAILED"
        );
        assert_eq!(
            ExecutorErrorCode::DataCorruption.code(),
            "BOOKDB_DATA_CORRUPTION"
        );
    }

    #[test]
    fn test_corruption_is_fatal() {
        let err = ExecutorError::data_corruption(12, "indexed but not stored");
        assert!(err.is_fatal());
        assert_eq!(err.document_id(), Some(12));
    }

    #[test]
    fn test_execution_failed_not_fatal() {
        let err = ExecutorError::execution_failed("skip overflow");
        assert!(!err.is_fatal());
        assert_eq!(err.code().severity(), Severity::Error);
    }

    #[test]
    fn test_error_display() {
        let err = ExecutorError::data_corruption(100, "indexed but not stored");
        let display = format!("{}", err);
        assert!(display.contains("BOOKDB_DATA_CORRUPTION"));
        assert!(display.contains("FATAL"));
        assert!(display.contains("Document 100"));
    }
}
