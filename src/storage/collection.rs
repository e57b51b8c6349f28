//! In-memory document collection
//!
//! Documents are JSON objects keyed by a monotonically increasing
//! `DocumentId`; ascending id order is natural (insertion) order. Secondary
//! indexes are maintained after every storage write.
//!
//! # Write path
//!
//! 1. Validate the document shape
//! 2. Write the body into storage
//! 3. Apply the write to every index

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::aggregate::{AggregateResult, Pipeline};
use crate::executor::{ExecutionResult, QueryExecutor, StorageRead};
use crate::index::{DocumentId, IndexManager, IndexResult, IndexSpec};
use crate::query::{ExplainPlan, FindQuery, Predicate, QueryPlan, QueryPlanner};

use super::errors::{CollectionResult, StorageError, StorageResult};
use super::snapshot::{read_snapshot, write_snapshot};

/// Result of an `updateOne`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Result of a `deleteOne`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// A single collection of JSON documents
#[derive(Debug)]
pub struct Collection {
    name: String,
    documents: BTreeMap<DocumentId, Value>,
    next_id: DocumentId,
    indexes: IndexManager,
}

impl Collection {
    /// Creates an empty collection
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: BTreeMap::new(),
            next_id: 1,
            indexes: IndexManager::new(),
        }
    }

    /// Loads a collection from a snapshot file. A missing file yields an
    /// empty collection. Indexes are not persisted and start empty.
    pub fn load_snapshot(name: impl Into<String>, path: &Path) -> StorageResult<Self> {
        let mut collection = Self::new(name);
        for record in read_snapshot(path)? {
            if !record.body.is_object() {
                return Err(StorageError::data_corruption(format!(
                    "Document {} is not an object",
                    record.id
                )));
            }
            collection.next_id = record.id + 1;
            collection.documents.insert(record.id, record.body);
        }
        Ok(collection)
    }

    /// Writes every document to a snapshot file. Returns the record count.
    pub fn save_snapshot(&self, path: &Path) -> StorageResult<usize> {
        write_snapshot(path, self.scan())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Inserts a document and returns its id
    pub fn insert(&mut self, document: Value) -> StorageResult<DocumentId> {
        match &document {
            Value::Object(obj) if obj.contains_key("_id") => {
                return Err(StorageError::document_invalid(
                    "_id is assigned by the collection",
                ))
            }
            Value::Object(_) => {}
            _ => return Err(StorageError::document_invalid("document must be a JSON object")),
        }

        let id = self.next_id;
        self.next_id += 1;
        self.documents.insert(id, document);
        if let Some(body) = self.documents.get(&id) {
            self.indexes.apply_write(id, body);
        }
        Ok(id)
    }

    pub fn get(&self, id: DocumentId) -> Option<&Value> {
        self.documents.get(&id)
    }

    /// All documents in natural order
    pub fn scan(&self) -> impl Iterator<Item = (DocumentId, &Value)> {
        self.documents.iter().map(|(id, body)| (*id, body))
    }

    /// Plans and executes a find query
    pub fn find(&self, query: &FindQuery) -> CollectionResult<ExecutionResult> {
        let plan = self.plan(query)?;
        let executor = QueryExecutor::new(&self.indexes, self);
        Ok(executor.execute(&plan)?)
    }

    /// Explains a find query without executing it
    pub fn explain(&self, query: &FindQuery) -> ExplainPlan {
        let metadata = self.indexes.metadata();
        match QueryPlanner::new(&metadata).plan(query) {
            Ok(plan) => ExplainPlan::from_plan(&plan),
            Err(err) => ExplainPlan::from_error(&err),
        }
    }

    /// `updateOne(filter, {$set: set})`: the first matching document in
    /// natural order gets every field of `set` assigned.
    pub fn update_one(
        &mut self,
        filter: Vec<Predicate>,
        set: Map<String, Value>,
    ) -> CollectionResult<UpdateOutcome> {
        if set.contains_key("_id") {
            return Err(StorageError::document_invalid("_id cannot be modified").into());
        }

        let id = match self.first_match(filter)? {
            Some(id) => id,
            None => {
                return Ok(UpdateOutcome {
                    matched_count: 0,
                    modified_count: 0,
                })
            }
        };

        let old = match self.documents.get(&id) {
            Some(body) => body.clone(),
            None => {
                return Err(StorageError::data_corruption(format!(
                    "Document {} matched but vanished",
                    id
                ))
                .into())
            }
        };

        let mut new = old.clone();
        if let Value::Object(obj) = &mut new {
            for (field, value) in set {
                obj.insert(field, value);
            }
        }

        if new == old {
            return Ok(UpdateOutcome {
                matched_count: 1,
                modified_count: 0,
            });
        }

        self.indexes.apply_delete(id, &old);
        self.documents.insert(id, new);
        if let Some(body) = self.documents.get(&id) {
            self.indexes.apply_write(id, body);
        }

        Ok(UpdateOutcome {
            matched_count: 1,
            modified_count: 1,
        })
    }

    /// `deleteOne(filter)`: removes the first matching document
    pub fn delete_one(&mut self, filter: Vec<Predicate>) -> CollectionResult<DeleteOutcome> {
        let id = match self.first_match(filter)? {
            Some(id) => id,
            None => return Ok(DeleteOutcome { deleted_count: 0 }),
        };

        match self.documents.remove(&id) {
            Some(old) => {
                self.indexes.apply_delete(id, &old);
                Ok(DeleteOutcome { deleted_count: 1 })
            }
            None => Ok(DeleteOutcome { deleted_count: 0 }),
        }
    }

    /// Runs an aggregation pipeline over the collection in natural order
    pub fn aggregate(&self, pipeline: &Pipeline) -> AggregateResult<Vec<Value>> {
        pipeline.run(self.documents.values().cloned())
    }

    /// Declares and builds an index. Returns false if it already existed.
    pub fn create_index(&mut self, spec: IndexSpec) -> IndexResult<bool> {
        let documents = &self.documents;
        self.indexes
            .create_index(spec, documents.iter().map(|(id, body)| (*id, body)))
    }

    /// Drops an index by name
    pub fn drop_index(&mut self, name: &str) -> bool {
        self.indexes.drop_index(name)
    }

    /// Names of all declared indexes, sorted
    pub fn index_names(&self) -> Vec<String> {
        self.indexes.index_names()
    }

    /// Read access to the index manager
    pub fn indexes(&self) -> &IndexManager {
        &self.indexes
    }

    fn plan(&self, query: &FindQuery) -> CollectionResult<QueryPlan> {
        let metadata = self.indexes.metadata();
        Ok(QueryPlanner::new(&metadata).plan(query)?)
    }

    fn first_match(&self, filter: Vec<Predicate>) -> CollectionResult<Option<DocumentId>> {
        let mut query = FindQuery::new().with_limit(1);
        query.predicates = filter;
        let result = self.find(&query)?;
        let id = result.iter().next().map(|doc| doc.id);
        Ok(id)
    }
}

impl StorageRead for Collection {
    fn read(&self, id: DocumentId) -> Option<&Value> {
        self.documents.get(&id)
    }

    fn scan_ids(&self) -> Vec<DocumentId> {
        self.documents.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ScanType;
    use crate::storage::CollectionError;
    use serde_json::json;
    use tempfile::TempDir;

    fn collection() -> Collection {
        let rows = [
            ("Emma", "Jane Austen", 1815, 7.25),
            ("Persuasion", "Jane Austen", 1817, 8.0),
            ("Emma", "Someone Else", 2020, 3.0),
        ];

        let mut c = Collection::new("books");
        for (title, author, year, price) in rows {
            c.insert(json!({
                "title": title,
                "author": author,
                "published_year": year,
                "price": price
            }))
            .unwrap();
        }
        c
    }

    fn set(field: &str, value: Value) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert(field.to_string(), value);
        m
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let mut c = Collection::new("books");
        let a = c.insert(json!({"title": "A"})).unwrap();
        let b = c.insert(json!({"title": "B"})).unwrap();
        assert!(b > a);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_insert_rejects_non_objects_and_ids() {
        let mut c = Collection::new("books");
        assert!(c.insert(json!("nope")).is_err());
        assert!(c.insert(json!({"_id": 1, "title": "A"})).is_err());
        assert!(c.is_empty());
    }

    #[test]
    fn test_update_one_touches_first_match_only() {
        let mut c = collection();
        let outcome = c
            .update_one(vec![Predicate::eq("title", "Emma")], set("price", json!(9.5)))
            .unwrap();
        assert_eq!(outcome, UpdateOutcome { matched_count: 1, modified_count: 1 });
        assert_eq!(c.get(1).unwrap()["price"], json!(9.5));
        assert_eq!(c.get(3).unwrap()["price"], json!(3.0));

        let again = c
            .update_one(vec![Predicate::eq("title", "Emma")], set("price", json!(9.5)))
            .unwrap();
        assert_eq!(again.modified_count, 0);

        let none = c
            .update_one(vec![Predicate::eq("title", "Ulysses")], set("price", json!(1.0)))
            .unwrap();
        assert_eq!(none.matched_count, 0);
    }

    #[test]
    fn test_delete_one_then_noop() {
        let mut c = collection();
        let first = c.delete_one(vec![Predicate::eq("title", "Persuasion")]).unwrap();
        assert_eq!(first.deleted_count, 1);
        let second = c.delete_one(vec![Predicate::eq("title", "Persuasion")]).unwrap();
        assert_eq!(second.deleted_count, 0);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_indexes_follow_writes() {
        let mut c = collection();
        assert!(c.create_index(IndexSpec::ascending(["title"]).unwrap()).unwrap());
        assert!(!c.create_index(IndexSpec::ascending(["title"]).unwrap()).unwrap());

        let query = FindQuery::new().filter_eq("title", "Emma");
        assert_eq!(
            c.explain(&query).scan_type.as_deref(),
            Some(ScanType::IndexedEquality.as_str())
        );
        assert_eq!(c.find(&query).unwrap().len(), 2);

        c.delete_one(vec![Predicate::eq("title", "Emma")]).unwrap();
        let ids: Vec<DocumentId> = c.find(&query).unwrap().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![3]);

        c.update_one(vec![Predicate::eq("title", "Emma")], set("title", json!("Emma (2020)")))
            .unwrap();
        assert!(c.find(&query).unwrap().is_empty());
        assert_eq!(c.indexes().entry_count("title_1"), Some(2));
    }

    #[test]
    fn test_rejected_query_is_explained_not_run() {
        let c = collection();
        let query = FindQuery::new().filter_eq("title", "Emma").with_limit(0);

        let plan = c.explain(&query);
        assert!(!plan.accepted);
        assert_eq!(plan.rejection_code.as_deref(), Some("BOOKDB_QUERY_INVALID"));

        let err = c.find(&query).unwrap_err();
        assert!(matches!(err, CollectionError::Query(_)));
        assert_eq!(err.code(), "BOOKDB_QUERY_INVALID");
    }

    #[test]
    fn test_first_match_in_natural_order() {
        let mut c = collection();
        c.delete_one(vec![Predicate::eq("author", "Jane Austen")]).unwrap();
        let titles: Vec<&str> = c.scan().map(|(_, b)| b["title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["Persuasion", "Emma"]);
    }

    #[test]
    fn test_update_rejects_id_change() {
        let mut c = collection();
        let err = c
            .update_one(vec![Predicate::eq("title", "Emma")], set("_id", json!(42)))
            .unwrap_err();
        assert_eq!(err.code(), "BOOKDB_DOCUMENT_INVALID");
    }

    #[test]
    fn test_snapshot_round_trip_preserves_ids() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("books.jsonl");

        let mut c = collection();
        c.delete_one(vec![Predicate::eq("title", "Persuasion")]).unwrap();
        assert_eq!(c.save_snapshot(&path).unwrap(), 2);

        let mut loaded = Collection::load_snapshot("books", &path).unwrap();
        let ids: Vec<DocumentId> = loaded.scan().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(loaded.insert(json!({"title": "New"})).unwrap(), 4);
    }
}
