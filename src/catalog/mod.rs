//! Book catalog for bookdb
//!
//! The fixed set of queries against the `books` collection: filters,
//! projection, paginated listing, aggregations, index declarations and
//! the two single-document mutations.

mod errors;
mod outputs;
mod queries;

pub use errors::{CatalogError, CatalogResult};
pub use outputs::{
    AuthorBookCount, BookSummary, DecadeCount, DeleteOutcome, GenreAveragePrice, UpdateOutcome,
    DEFAULT_PAGE_SIZE,
};
pub use queries::{BookQueries, BOOKS_COLLECTION, LIST_PAGE_AFTER_YEAR};
