//! The book query set
//!
//! Each query is a fixed template over the `books` collection, expressed
//! with the engine's query AST and aggregation stages. Reads are
//! idempotent; `update_price` and `delete_by_title` touch at most one book.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::aggregate::{Accumulator, GroupKey, Pipeline, ProjectField, Stage};
use crate::index::{DocumentId, IndexSpec};
use crate::observability::{Logger, ObservationScope};
use crate::query::{
    ExplainPlan, FindQuery, Predicate, Projection, QueryError, SortDirection, SortSpec,
};
use crate::schema::{Book, BookValidator};
use crate::storage::{read_json_array, Collection};

use super::errors::{CatalogError, CatalogResult};
use super::outputs::{
    AuthorBookCount, BookSummary, DecadeCount, DeleteOutcome, GenreAveragePrice, UpdateOutcome,
};

/// Name of the backing collection
pub const BOOKS_COLLECTION: &str = "books";

/// Year after which `list_page` lists books
pub const LIST_PAGE_AFTER_YEAR: i32 = 2010;

/// Typed access to the `books` collection
#[derive(Debug)]
pub struct BookQueries {
    collection: Collection,
}

impl Default for BookQueries {
    fn default() -> Self {
        Self::new()
    }
}

impl BookQueries {
    /// Empty `books` collection
    pub fn new() -> Self {
        Self {
            collection: Collection::new(BOOKS_COLLECTION),
        }
    }

    /// Wraps an existing collection
    pub fn from_collection(collection: Collection) -> Self {
        Self { collection }
    }

    /// Loads a snapshot and validates every stored book
    pub fn open(path: &Path) -> CatalogResult<Self> {
        let path_str = path.display().to_string();
        let scope = ObservationScope::with_fields("SNAPSHOT_LOAD", &[("path", path_str.as_str())]);

        let loaded = Collection::load_snapshot(BOOKS_COLLECTION, path)
            .map_err(CatalogError::from)
            .and_then(|c| {
                for (_, body) in c.scan() {
                    BookValidator::validate(body)?;
                }
                Ok(c)
            });

        match loaded {
            Ok(collection) => {
                scope.complete_with_fields(&[("documents", collection.len().to_string().as_str())]);
                Ok(Self { collection })
            }
            Err(err) => {
                scope.fail(&err.to_string(), err.is_fatal());
                Err(err)
            }
        }
    }

    /// Writes the collection to a snapshot file
    pub fn save(&self, path: &Path) -> CatalogResult<usize> {
        let path_str = path.display().to_string();
        let scope = ObservationScope::with_fields("SNAPSHOT_SAVE", &[("path", path_str.as_str())]);
        match self.collection.save_snapshot(path) {
            Ok(count) => {
                scope.complete_with_fields(&[("documents", count.to_string().as_str())]);
                Ok(count)
            }
            Err(err) => {
                scope.fail(&err.to_string(), err.is_fatal());
                Err(err.into())
            }
        }
    }

    /// The underlying collection, for generic queries
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn collection_mut(&mut self) -> &mut Collection {
        &mut self.collection
    }

    pub fn into_collection(self) -> Collection {
        self.collection
    }

    // ==================
    // Inserts
    // ==================

    /// Validates and inserts one book
    pub fn insert(&mut self, book: &Book) -> CatalogResult<DocumentId> {
        BookValidator::validate_book(book)?;
        self.insert_document(book.to_document()?)
    }

    /// Validates and inserts every book. Nothing is inserted if any book is
    /// invalid.
    pub fn insert_many<'b, I>(&mut self, books: I) -> CatalogResult<Vec<DocumentId>>
    where
        I: IntoIterator<Item = &'b Book>,
    {
        let mut documents = Vec::new();
        for book in books {
            BookValidator::validate_book(book)?;
            documents.push(BookValidator::prepare(book.to_document()?)?);
        }
        self.insert_prepared(documents)
    }

    /// Normalises, validates and inserts a raw document
    pub fn insert_document(&mut self, document: Value) -> CatalogResult<DocumentId> {
        let body = BookValidator::prepare(document)?;
        Ok(self.collection.insert(body)?)
    }

    /// Imports a JSON array of book documents. Nothing is inserted if any
    /// document is invalid.
    pub fn import_json_array(&mut self, path: &Path) -> CatalogResult<Vec<DocumentId>> {
        let documents = read_json_array(path)?
            .into_iter()
            .map(BookValidator::prepare)
            .collect::<Result<Vec<_>, _>>()?;
        self.insert_prepared(documents)
    }

    fn insert_prepared(&mut self, documents: Vec<Value>) -> CatalogResult<Vec<DocumentId>> {
        let mut ids = Vec::with_capacity(documents.len());
        for body in documents {
            ids.push(self.collection.insert(body)?);
        }
        Ok(ids)
    }

    // ==================
    // Filter queries
    // ==================

    /// All books of a genre
    pub fn find_by_genre(&self, genre: &str) -> CatalogResult<Vec<Book>> {
        self.find_as("find_by_genre", &Self::genre_query(genre))
    }

    /// All books published strictly after `year`
    pub fn find_published_after(&self, year: i32) -> CatalogResult<Vec<Book>> {
        self.find_as("find_published_after", &Self::published_after_query(year))
    }

    /// All books by an author
    pub fn find_by_author(&self, author: &str) -> CatalogResult<Vec<Book>> {
        self.find_as("find_by_author", &Self::author_query(author))
    }

    /// In-stock books published after `year`, as summaries
    pub fn find_in_stock_after_year(&self, year: i32) -> CatalogResult<Vec<BookSummary>> {
        self.find_as("find_in_stock_after_year", &Self::in_stock_after_query(year))
    }

    // ==================
    // Mutations
    // ==================

    /// Sets the price of the first book titled `title`
    pub fn update_price(&mut self, title: &str, new_price: f64) -> CatalogResult<UpdateOutcome> {
        BookValidator::check_price(new_price)?;

        let scope = ObservationScope::with_fields("UPDATE_PRICE", &[("title", title)]);
        let mut set = Map::new();
        set.insert("price".to_string(), Value::from(new_price));

        match self
            .collection
            .update_one(vec![Predicate::eq("title", title)], set)
            .map_err(CatalogError::from)
        {
            Ok(outcome) => {
                scope.complete_with_fields(&[
                    ("matched", outcome.matched_count.to_string().as_str()),
                    ("modified", outcome.modified_count.to_string().as_str()),
                ]);
                Ok(outcome)
            }
            Err(err) => {
                scope.fail(&err.to_string(), err.is_fatal());
                Err(err)
            }
        }
    }

    /// Deletes the first book titled `title`
    pub fn delete_by_title(&mut self, title: &str) -> CatalogResult<DeleteOutcome> {
        let scope = ObservationScope::with_fields("DELETE_BY_TITLE", &[("title", title)]);
        match self
            .collection
            .delete_one(vec![Predicate::eq("title", title)])
            .map_err(CatalogError::from)
        {
            Ok(outcome) => {
                let deleted = outcome.deleted_count.to_string();
                scope.complete_with_fields(&[("deleted", deleted.as_str())]);
                Ok(outcome)
            }
            Err(err) => {
                scope.fail(&err.to_string(), err.is_fatal());
                Err(err)
            }
        }
    }

    // ==================
    // Pagination
    // ==================

    /// One page of in-stock books published after 2010, sorted by
    /// `sort_field` (`1` ascending, `-1` descending)
    pub fn list_page(
        &self,
        page_index: u64,
        page_size: u64,
        sort_field: &str,
        sort_direction: i32,
    ) -> CatalogResult<Vec<BookSummary>> {
        let query = Self::page_query(page_index, page_size, sort_field, sort_direction)?;
        self.find_as("list_page", &query)
    }

    // ==================
    // Aggregations
    // ==================

    /// Mean price per genre, highest first
    pub fn average_price_by_genre(&self) -> CatalogResult<Vec<GenreAveragePrice>> {
        self.aggregate_as("average_price_by_genre", &Self::average_price_pipeline())
    }

    /// The author with the most books; ties go to the author seen first
    pub fn author_with_most_books(&self) -> CatalogResult<Option<AuthorBookCount>> {
        let mut top: Vec<AuthorBookCount> =
            self.aggregate_as("author_with_most_books", &Self::top_author_pipeline())?;
        Ok(top.pop())
    }

    /// Book counts per publication decade, oldest first
    pub fn counts_by_decade(&self) -> CatalogResult<Vec<DecadeCount>> {
        self.aggregate_as("counts_by_decade", &Self::decade_pipeline())
    }

    // ==================
    // Indexes
    // ==================

    /// Creates the `title` and `(author, published_year)` indexes if
    /// missing. Returns their names.
    pub fn ensure_indexes(&mut self) -> CatalogResult<Vec<String>> {
        let specs = [
            IndexSpec::ascending(["title"])?,
            IndexSpec::ascending(["author", "published_year"])?,
        ];

        let mut names = Vec::with_capacity(specs.len());
        for spec in specs {
            let name = spec.name();
            if self.collection.create_index(spec)? {
                Logger::info("INDEX_CREATED", &[("index", name.as_str())]);
            }
            names.push(name);
        }
        Ok(names)
    }

    // ==================
    // Explain
    // ==================

    pub fn explain_by_genre(&self, genre: &str) -> ExplainPlan {
        self.collection.explain(&Self::genre_query(genre))
    }

    pub fn explain_published_after(&self, year: i32) -> ExplainPlan {
        self.collection.explain(&Self::published_after_query(year))
    }

    pub fn explain_by_author(&self, author: &str) -> ExplainPlan {
        self.collection.explain(&Self::author_query(author))
    }

    pub fn explain_by_title(&self, title: &str) -> ExplainPlan {
        self.collection
            .explain(&FindQuery::new().filter_eq("title", title))
    }

    pub fn explain_in_stock_after_year(&self, year: i32) -> ExplainPlan {
        self.collection.explain(&Self::in_stock_after_query(year))
    }

    // ==================
    // Query templates
    // ==================

    pub fn genre_query(genre: &str) -> FindQuery {
        FindQuery::new().filter_eq("genre", genre)
    }

    pub fn published_after_query(year: i32) -> FindQuery {
        FindQuery::new().with_predicate(Predicate::gt("published_year", year))
    }

    pub fn author_query(author: &str) -> FindQuery {
        FindQuery::new().filter_eq("author", author)
    }

    pub fn in_stock_after_query(year: i32) -> FindQuery {
        FindQuery::new()
            .with_predicate(Predicate::gt("stock", 0))
            .with_predicate(Predicate::gt("published_year", year))
            .with_projection(Projection::include(["title", "author", "price"]).without_id())
    }

    pub fn page_query(
        page_index: u64,
        page_size: u64,
        sort_field: &str,
        sort_direction: i32,
    ) -> CatalogResult<FindQuery> {
        if page_size == 0 {
            return Err(QueryError::invalid_page_size(page_size).into());
        }
        let direction = SortDirection::from_i32(sort_direction)
            .ok_or_else(|| QueryError::invalid_sort_direction(sort_direction))?;
        let skip = page_index.checked_mul(page_size).ok_or_else(|| {
            QueryError::query_invalid(format!(
                "page {} of size {} is out of range",
                page_index, page_size
            ))
        })?;

        Ok(Self::in_stock_after_query(LIST_PAGE_AFTER_YEAR)
            .with_sort(SortSpec::new(sort_field, direction))
            .with_skip(skip)
            .with_limit(page_size))
    }

    pub fn average_price_pipeline() -> Pipeline {
        Pipeline::new()
            .with_stage(Stage::Match(vec![
                Predicate::exists("genre"),
                Predicate::exists("price"),
            ]))
            .with_stage(Stage::Group {
                key: GroupKey::Field("genre".into()),
                accumulators: vec![("averagePrice".into(), Accumulator::Avg("price".into()))],
            })
            .with_stage(Stage::Sort(vec![SortSpec::desc("averagePrice")]))
    }

    pub fn top_author_pipeline() -> Pipeline {
        Pipeline::new()
            .with_stage(Stage::Match(vec![Predicate::exists("author")]))
            .with_stage(Stage::Group {
                key: GroupKey::Field("author".into()),
                accumulators: vec![("bookCount".into(), Accumulator::Count)],
            })
            .with_stage(Stage::Sort(vec![SortSpec::desc("bookCount")]))
            .with_stage(Stage::Limit(1))
    }

    pub fn decade_pipeline() -> Pipeline {
        Pipeline::new()
            .with_stage(Stage::Match(vec![Predicate::exists("published_year")]))
            .with_stage(Stage::Group {
                key: GroupKey::Decade("published_year".into()),
                accumulators: vec![("bookCount".into(), Accumulator::Count)],
            })
            .with_stage(Stage::Sort(vec![SortSpec::asc("_id")]))
            .with_stage(Stage::Project {
                fields: vec![
                    ProjectField::Alias {
                        output: "decade".into(),
                        source: "_id".into(),
                    },
                    ProjectField::Include("bookCount".into()),
                ],
                include_id: false,
            })
    }

    // ==================
    // Execution helpers
    // ==================

    fn find_as<T: DeserializeOwned>(&self, name: &str, query: &FindQuery) -> CatalogResult<Vec<T>> {
        let scope = ObservationScope::with_fields("QUERY", &[("query", name)]);
        let result = self
            .collection
            .find(query)
            .map_err(CatalogError::from)
            .and_then(|r| {
                let counts = (r.scanned_count, r.returned_count);
                decode(r.into_bodies()).map(|docs| (docs, counts))
            });

        match result {
            Ok((docs, (scanned, returned))) => {
                scope.complete_with_fields(&[
                    ("scanned", scanned.to_string().as_str()),
                    ("returned", returned.to_string().as_str()),
                ]);
                Ok(docs)
            }
            Err(err) => {
                scope.fail(&err.to_string(), err.is_fatal());
                Err(err)
            }
        }
    }

    fn aggregate_as<T: DeserializeOwned>(
        &self,
        name: &str,
        pipeline: &Pipeline,
    ) -> CatalogResult<Vec<T>> {
        let scope = ObservationScope::with_fields("AGGREGATE", &[("pipeline", name)]);
        let result = self
            .collection
            .aggregate(pipeline)
            .map_err(CatalogError::from)
            .and_then(decode);

        match result {
            Ok(docs) => {
                scope.complete_with_fields(&[("returned", docs.len().to_string().as_str())]);
                Ok(docs)
            }
            Err(err) => {
                scope.fail(&err.to_string(), err.is_fatal());
                Err(err)
            }
        }
    }
}

fn decode<T: DeserializeOwned>(documents: Vec<Value>) -> CatalogResult<Vec<T>> {
    documents
        .into_iter()
        .map(|d| serde_json::from_value(d).map_err(CatalogError::from))
        .collect()
}
