//! Typed results of the book queries
//!
//! Aggregation results decode straight from the pipeline documents, so
//! the group key is also accepted under `_id`.

use serde::{Deserialize, Serialize};

pub use crate::storage::{DeleteOutcome, UpdateOutcome};

/// Books per page when no size is given
pub const DEFAULT_PAGE_SIZE: u64 = 5;

/// `{title, author, price}` projection without `_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// Mean price of one genre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreAveragePrice {
    #[serde(alias = "_id")]
    pub genre: String,
    pub average_price: f64,
}

/// Number of books by one author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorBookCount {
    #[serde(alias = "_id")]
    pub author: String,
    pub book_count: u64,
}

/// Number of books published in one decade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecadeCount {
    pub decade: i64,
    pub book_count: u64,
}
