//! Result types for query execution

use serde_json::Value;

use crate::index::DocumentId;

/// A single document in the result set
#[derive(Debug, Clone, PartialEq)]
pub struct ResultDocument {
    /// Document ID
    pub id: DocumentId,
    /// Document body as JSON (projected when the query has a projection)
    pub body: Value,
}

impl ResultDocument {
    /// Creates a new result document
    pub fn new(id: DocumentId, body: Value) -> Self {
        Self { id, body }
    }

    /// Returns the document ID
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Returns the document body
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Consumes the result, returning the body
    pub fn into_body(self) -> Value {
        self.body
    }
}

/// Result of query execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Documents in result order
    pub documents: Vec<ResultDocument>,
    /// Number of candidate documents examined
    pub scanned_count: usize,
    /// Number of documents that matched every predicate
    pub matched_count: usize,
    /// Number of documents returned
    pub returned_count: usize,
}

impl ExecutionResult {
    /// Creates an empty result
    pub fn empty() -> Self {
        Self {
            documents: Vec::new(),
            scanned_count: 0,
            matched_count: 0,
            returned_count: 0,
        }
    }

    /// Returns true if no documents were returned
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns the number of results
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns an iterator over the documents
    pub fn iter(&self) -> impl Iterator<Item = &ResultDocument> {
        self.documents.iter()
    }

    /// Consumes the result, returning the bodies in order
    pub fn into_bodies(self) -> Vec<Value> {
        self.documents.into_iter().map(ResultDocument::into_body).collect()
    }
}
