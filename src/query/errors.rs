//! Query error types
//!
//! Error codes:
//! - BOOKDB_QUERY_INVALID (REJECT)
//! - BOOKDB_INVALID_SORT_DIRECTION (REJECT)
//! - BOOKDB_INVALID_PAGE_SIZE (REJECT)

use std::fmt;

/// Severity levels for query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Query-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// Malformed query structure
    QueryInvalid,
    /// Sort direction other than 1 or -1
    InvalidSortDirection,
    /// Page size of zero
    InvalidPageSize,
}

impl QueryErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::QueryInvalid => "BOOKDB_QUERY_INVALID",
            QueryErrorCode::InvalidSortDirection => "BOOKDB_INVALID_SORT_DIRECTION",
            QueryErrorCode::InvalidPageSize => "BOOKDB_INVALID_PAGE_SIZE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query error type with full context
#[derive(Debug, Clone)]
pub struct QueryError {
    code: QueryErrorCode,
    message: String,
    field: Option<String>,
}

impl QueryError {
    /// Create a query invalid error
    pub fn query_invalid(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::QueryInvalid,
            message: reason.into(),
            field: None,
        }
    }

    /// Create a query invalid error attached to a field
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: QueryErrorCode::QueryInvalid,
            message: format!("Field '{}': {}", f, reason.into()),
            field: Some(f),
        }
    }

    /// Create an invalid sort direction error
    pub fn invalid_sort_direction(direction: i32) -> Self {
        Self {
            code: QueryErrorCode::InvalidSortDirection,
            message: format!("Sort direction must be 1 or -1, got {}", direction),
            field: None,
        }
    }

    /// Create an invalid page size error
    pub fn invalid_page_size(page_size: u64) -> Self {
        Self {
            code: QueryErrorCode::InvalidPageSize,
            message: format!("Page size must be positive, got {}", page_size),
            field: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> QueryErrorCode {
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

    /// Returns the field name if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for QueryError {
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

impl std::error::Error for QueryError {}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
