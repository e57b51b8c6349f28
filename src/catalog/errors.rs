//! # Catalog Errors
//!
//! Error type for book queries and collection operations. Wraps the coded
//! errors of every subsystem a query can touch.

use thiserror::Error;

use crate::aggregate::AggregateError;
use crate::executor::ExecutorError;
use crate::index::IndexError;
use crate::query::QueryError;
use crate::schema::SchemaError;
use crate::storage::{CollectionError, StorageError};

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Query rejected by the planner
    #[error("{0}")]
    Query(#[from] QueryError),

    /// Query execution failed
    #[error("{0}")]
    Executor(#[from] ExecutorError),

    /// Index declaration or build failed
    #[error("{0}")]
    Index(#[from] IndexError),

    /// Storage or snapshot failure
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// Book failed validation
    #[error("{0}")]
    Schema(#[from] SchemaError),

    /// Aggregation pipeline rejected
    #[error("{0}")]
    Aggregate(#[from] AggregateError),

    /// A result document did not have the expected shape
    #[error("Failed to decode result document: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<CollectionError> for CatalogError {
    fn from(e: CollectionError) -> Self {
        match e {
            CollectionError::Query(e) => CatalogError::Query(e),
            CollectionError::Executor(e) => CatalogError::Executor(e),
            CollectionError::Storage(e) => CatalogError::Storage(e),
        }
    }
}

impl CatalogError {
    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::Query(e) => e.code().code(),
            CatalogError::Executor(e) => e.code().code(),
            CatalogError::Index(e) => e.code().code(),
            CatalogError::Storage(e) => e.code().code(),
            CatalogError::Schema(e) => e.code().code(),
            CatalogError::Aggregate(e) => e.code().code(),
            CatalogError::Decode(_) => "BOOKDB_EXECUTION_FAILED",
        }
    }

    /// Returns whether the underlying error is fatal
    pub fn is_fatal(&self) -> bool {
        match self {
            CatalogError::Executor(e) => e.is_fatal(),
            CatalogError::Index(e) => e.is_fatal(),
            CatalogError::Storage(e) => e.is_fatal(),
            _ => false,
        }
    }
}
