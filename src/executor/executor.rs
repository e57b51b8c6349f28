//! Query executor for bookdb
//!
//! Executes query plans against a document source, producing deterministic
//! results.
//!
//! Execution flow (strict order):
//! 1. Use the plan's access path to obtain candidate document ids
//! 2. Read documents from storage
//! 3. Filter documents strictly according to predicates
//! 4. Apply sort (if specified), stable over natural order
//! 5. Apply skip
//! 6. Apply limit
//! 7. Apply projection
//! 8. Return ordered results

use serde_json::Value;

use crate::index::DocumentId;
use crate::query::{AccessPath, QueryPlan};

use super::errors::{ExecutorError, ExecutorResult};
use super::filters::PredicateFilter;
use super::projection::Projector;
use super::result::{ExecutionResult, ResultDocument};
use super::sorter::ResultSorter;

/// Trait for looking up document ids by index
pub trait IndexLookup {
    /// Ids whose leading indexed field equals `value`, ascending
    fn lookup_eq(&self, index: &str, value: &Value) -> Vec<DocumentId>;

    /// Ids whose leading indexed field lies in `[min, max]`, ascending
    fn lookup_range(&self, index: &str, min: Option<&Value>, max: Option<&Value>)
        -> Vec<DocumentId>;
}

/// Trait for reading documents from storage
pub trait StorageRead {
    /// Read the document with the given id
    fn read(&self, id: DocumentId) -> Option<&Value>;

    /// All document ids in natural order
    fn scan_ids(&self) -> Vec<DocumentId>;
}

/// Query executor that processes plans against storage
pub struct QueryExecutor<'a, I: IndexLookup, S: StorageRead> {
    index: &'a I,
    storage: &'a S,
}

impl<'a, I: IndexLookup, S: StorageRead> QueryExecutor<'a, I, S> {
    /// Creates a new executor
    pub fn new(index: &'a I, storage: &'a S) -> Self {
        Self { index, storage }
    }

    /// Executes a query plan and returns results.
    ///
    /// This method is deterministic: same plan + same data = same results.
    pub fn execute(&self, plan: &QueryPlan) -> ExecutorResult<ExecutionResult> {
        // Step 1: candidate ids, ascending
        let ids = self.candidate_ids(plan);

        // Steps 2-3: read and filter
        let mut matched = Vec::new();
        let mut scanned_count = 0;

        for id in ids {
            scanned_count += 1;

            let body = match self.storage.read(id) {
                Some(b) => b,
                None if plan.access == AccessPath::CollectionScan => continue,
                None => {
                    return Err(ExecutorError::data_corruption(
                        id,
                        "indexed but not present in storage",
                    ))
                }
            };

            if PredicateFilter::matches(body, &plan.predicates) {
                matched.push(ResultDocument::new(id, body.clone()));
            }
        }
        let matched_count = matched.len();

        // Step 4: sort
        if let Some(sort_spec) = &plan.sort {
            ResultSorter::sort(&mut matched, sort_spec);
        }

        // Steps 5-6: skip and limit
        let skip = usize::try_from(plan.skip)
            .map_err(|_| ExecutorError::execution_failed(format!("skip {} too large", plan.skip)))?;
        let limit = match plan.limit {
            Some(l) => usize::try_from(l).unwrap_or(usize::MAX),
            None => usize::MAX,
        };

        // Step 7: project
        let documents: Vec<ResultDocument> = matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| match &plan.projection {
                Some(projection) => {
                    let body = Projector::apply(projection, doc.id, &doc.body);
                    ResultDocument::new(doc.id, body)
                }
                None => doc,
            })
            .collect();

        // Step 8: return ordered results
        Ok(ExecutionResult {
            returned_count: documents.len(),
            scanned_count,
            matched_count,
            documents,
        })
    }

    /// Gets candidate document ids based on the plan's access path.
    fn candidate_ids(&self, plan: &QueryPlan) -> Vec<DocumentId> {
        match &plan.access {
            AccessPath::CollectionScan => self.storage.scan_ids(),
            AccessPath::IndexEq { index, value } => self.index.lookup_eq(index, value),
            AccessPath::IndexRange {
                index,
                lower,
                upper,
            } => self
                .index
                .lookup_range(index, lower.as_ref(), upper.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexMetadata, IndexSpec};
    use crate::query::{FindQuery, Predicate, Projection, QueryPlanner, ScanType, SortSpec};
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap};

    /// Mock index for testing
    struct MockIndex {
        eq: HashMap<String, Vec<DocumentId>>,
        range: Vec<DocumentId>,
    }

    impl MockIndex {
        fn new() -> Self {
            Self {
                eq: HashMap::new(),
                range: Vec::new(),
            }
        }

        fn add(&mut self, value: &str, id: DocumentId) {
            self.eq.entry(value.to_string()).or_default().push(id);
        }
    }

    impl IndexLookup for MockIndex {
        fn lookup_eq(&self, _index: &str, value: &Value) -> Vec<DocumentId> {
            value
                .as_str()
                .and_then(|v| self.eq.get(v))
                .cloned()
                .unwrap_or_default()
        }

        fn lookup_range(
            &self,
            _index: &str,
            _min: Option<&Value>,
            _max: Option<&Value>,
        ) -> Vec<DocumentId> {
            self.range.clone()
        }
    }

    /// Mock storage for testing
    struct MockStorage {
        documents: BTreeMap<DocumentId, Value>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                documents: BTreeMap::new(),
            }
        }

        fn add(&mut self, id: DocumentId, body: Value) {
            self.documents.insert(id, body);
        }
    }

    impl StorageRead for MockStorage {
        fn read(&self, id: DocumentId) -> Option<&Value> {
            self.documents.get(&id)
        }

        fn scan_ids(&self) -> Vec<DocumentId> {
            self.documents.keys().copied().collect()
        }
    }

    fn shelf() -> MockStorage {
        let rows = [
            ("Dune", 9.99, 1965, 2),
            ("Circe", 14.5, 2018, 0),
            ("Educated", 12.0, 2018, 6),
            ("Normal People", 11.0, 2018, 1),
            ("The Martian", 8.5, 2011, 3),
        ];

        let mut storage = MockStorage::new();
        for (id, (title, price, year, stock)) in (1..).zip(rows) {
            storage.add(
                id,
                json!({"title": title, "price": price, "published_year": year, "stock": stock}),
            );
        }
        storage
    }

    fn plan(query: &FindQuery) -> QueryPlan {
        QueryPlanner::new(&IndexMetadata::new()).plan(query).unwrap()
    }

    #[test]
    fn test_collection_scan_filter() {
        let storage = shelf();
        let index = MockIndex::new();
        let executor = QueryExecutor::new(&index, &storage);

        let query = FindQuery::new()
            .with_predicate(Predicate::gt("stock", 0))
            .with_predicate(Predicate::gt("published_year", 2010));
        let result = executor.execute(&plan(&query)).unwrap();

        let ids: Vec<DocumentId> = result.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
        assert_eq!(result.scanned_count, 5);
        assert_eq!(result.matched_count, 3);
    }

    #[test]
    fn test_indexed_equality_execution() {
        let storage = shelf();
        let mut index = MockIndex::new();
        index.add("Educated", 3);

        let indexes = IndexMetadata::with_specs([IndexSpec::ascending(["title"]).unwrap()]);
        let plan = QueryPlanner::new(&indexes)
            .plan(&FindQuery::new().filter_eq("title", "Educated"))
            .unwrap();
        assert_eq!(plan.scan_type, ScanType::IndexedEquality);

        let executor = QueryExecutor::new(&index, &storage);
        let result = executor.execute(&plan).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.documents[0].id, 3);
        assert_eq!(result.scanned_count, 1);
    }

    #[test]
    fn test_sort_skip_limit_project() {
        let storage = shelf();
        let index = MockIndex::new();
        let executor = QueryExecutor::new(&index, &storage);

        let query = FindQuery::new()
            .with_predicate(Predicate::gt("published_year", 2010))
            .with_projection(Projection::include(["title", "price"]).without_id())
            .with_sort(SortSpec::asc("price"))
            .with_skip(1)
            .with_limit(2);
        let result = executor.execute(&plan(&query)).unwrap();

        assert_eq!(
            result.into_bodies(),
            vec![
                json!({"title": "Normal People", "price": 11.0}),
                json!({"title": "Educated", "price": 12.0}),
            ]
        );
    }

    #[test]
    fn test_skip_past_end_is_empty() {
        let storage = shelf();
        let index = MockIndex::new();
        let executor = QueryExecutor::new(&index, &storage);

        let result = executor
            .execute(&plan(&FindQuery::new().with_skip(10).with_limit(5)))
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.matched_count, 5);
    }

    #[test]
    fn test_dangling_index_entry_is_fatal() {
        let storage = shelf();
        let mut index = MockIndex::new();
        index.add("Ghost", 99);

        let indexes = IndexMetadata::with_specs([IndexSpec::ascending(["title"]).unwrap()]);
        let plan = QueryPlanner::new(&indexes)
            .plan(&FindQuery::new().filter_eq("title", "Ghost"))
            .unwrap();

        let executor = QueryExecutor::new(&index, &storage);
        let err = executor.execute(&plan).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.document_id(), Some(99));
    }

    #[test]
    fn test_index_narrows_predicates_decide() {
        let storage = shelf();
        let mut index = MockIndex::new();
        index.range = vec![1, 2, 3, 4, 5];

        let year_index = IndexSpec::ascending(["published_year"]).unwrap();
        let indexes = IndexMetadata::with_specs([year_index]);
        let plan = QueryPlanner::new(&indexes)
            .plan(&FindQuery::new().with_predicate(Predicate::gt("published_year", 2011)))
            .unwrap();
        assert_eq!(plan.scan_type, ScanType::IndexedRange);

        let executor = QueryExecutor::new(&index, &storage);
        let ids: Vec<DocumentId> = executor
            .execute(&plan)
            .unwrap()
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn test_deterministic_ordering() {
        let storage = shelf();
        let index = MockIndex::new();
        let query = FindQuery::new().with_sort(SortSpec::desc("published_year"));
        let plan = plan(&query);

        let first: Vec<DocumentId> = QueryExecutor::new(&index, &storage)
            .execute(&plan)
            .unwrap()
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(first, vec![2, 3, 4, 5, 1]);

        for _ in 0..3 {
            let again: Vec<DocumentId> = QueryExecutor::new(&index, &storage)
                .execute(&plan)
                .unwrap()
                .iter()
                .map(|d| d.id)
                .collect();
            assert_eq!(again, first);
        }
    }
}
