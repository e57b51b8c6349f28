//! The typed book record
//!
//! Optional fields are `Option`s; a JSON `null` deserializes as `None` and
//! `None` is never written. Fields the record does not name are kept in
//! `extra` so that storage round-trips them untouched.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A record of the `books` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Copies on hand; in stock means `stock > 0`
    #[serde(default, deserialize_with = "null_as_zero")]
    pub stock: u32,
    /// Untyped fields (`pages`, `publisher`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            genre: None,
            published_year: None,
            price: None,
            stock: 0,
            extra: Map::new(),
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_published_year(mut self, year: i32) -> Self {
        self.published_year = Some(year);
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Decodes a stored document
    pub fn from_document(document: &Value) -> serde_json::Result<Self> {
        Book::deserialize(document)
    }

    /// Encodes the record as a document body
    pub fn to_document(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// `stock: null` reads as no copies
fn null_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_default())
}
