//! Book validation
//!
//! Validation semantics:
//! - `title` and `author` are present, non-empty strings
//! - `genre` is a string when present
//! - `published_year` is an integer in `i32` range when present
//! - `price` is a finite, non-negative number when present
//! - `stock` is a non-negative integer in `u32` range when present
//! - `null` is treated as absent for optional fields
//!
//! Normalisation runs first and is the only step that mutates:
//! - a client-supplied `_id` is dropped; identifiers are assigned by storage
//! - a legacy boolean `in_stock` becomes `stock` (1 or 0) unless `stock`
//!   is already present, and the `in_stock` key is removed
//! - a `null` typed optional field is removed

use serde_json::{Map, Value};

use super::book::Book;
use super::errors::{SchemaError, SchemaResult, ValidationDetails};

/// Typed optional fields of a book
const OPTIONAL_FIELDS: [&str; 4] = ["genre", "published_year", "price", "stock"];

/// Stateless validator for book documents
pub struct BookValidator;

impl BookValidator {
    /// Normalises then validates a document, returning the body to store
    pub fn prepare(document: Value) -> SchemaResult<Value> {
        let document = Self::normalize(document)?;
        Self::validate(&document)?;
        Ok(document)
    }

    /// Rewrites legacy fields into their canonical form
    pub fn normalize(document: Value) -> SchemaResult<Value> {
        let mut obj = match document {
            Value::Object(obj) => obj,
            other => return Err(type_error("$root", "object", &other)),
        };

        obj.remove("_id");

        if let Some(flag) = obj.remove("in_stock") {
            match flag {
                Value::Bool(b) => {
                    if !has_value(&obj, "stock") {
                        obj.insert("stock".to_string(), Value::from(u32::from(b)));
                    }
                }
                Value::Null => {}
                other => return Err(type_error("in_stock", "bool", &other)),
            }
        }

        for field in OPTIONAL_FIELDS {
            if matches!(obj.get(field), Some(Value::Null)) {
                obj.remove(field);
            }
        }

        Ok(Value::Object(obj))
    }

    /// Checks a document against the book schema. Does not mutate.
    pub fn validate(document: &Value) -> SchemaResult<()> {
        let obj = document
            .as_object()
            .ok_or_else(|| type_error("$root", "object", document))?;

        for field in ["title", "author"] {
            match obj.get(field) {
                None | Some(Value::Null) => {
                    return Err(SchemaError::validation_failed(
                        ValidationDetails::missing_field(field),
                    ))
                }
                Some(Value::String(s)) if s.trim().is_empty() => {
                    return Err(SchemaError::validation_failed(
                        ValidationDetails::empty_string(field),
                    ))
                }
                Some(Value::String(_)) => {}
                Some(other) => return Err(type_error(field, "string", other)),
            }
        }

        if let Some(genre) = present(obj, "genre") {
            if !genre.is_string() {
                return Err(type_error("genre", "string", genre));
            }
        }

        if let Some(year) = present(obj, "published_year") {
            let n = integer(year).ok_or_else(|| type_error("published_year", "int", year))?;
            if i32::try_from(n).is_err() {
                return Err(SchemaError::validation_failed(ValidationDetails::out_of_range(
                    "published_year",
                    "32-bit year",
                    n,
                )));
            }
        }

        if let Some(price) = present(obj, "price") {
            let p = price
                .as_f64()
                .ok_or_else(|| type_error("price", "float", price))?;
            Self::check_price(p)?;
        }

        if let Some(stock) = present(obj, "stock") {
            let n = integer(stock).ok_or_else(|| type_error("stock", "int", stock))?;
            if u32::try_from(n).is_err() {
                return Err(SchemaError::validation_failed(ValidationDetails::out_of_range(
                    "stock",
                    "non-negative quantity",
                    n,
                )));
            }
        }

        Ok(())
    }

    /// Checks a typed record before it is encoded
    pub fn validate_book(book: &Book) -> SchemaResult<()> {
        if book.title.trim().is_empty() {
            return Err(SchemaError::validation_failed(ValidationDetails::empty_string("title")));
        }
        if book.author.trim().is_empty() {
            return Err(SchemaError::validation_failed(ValidationDetails::empty_string("author")));
        }
        if let Some(p) = book.price {
            Self::check_price(p)?;
        }
        Ok(())
    }

    /// A price must be finite and non-negative
    pub fn check_price(price: f64) -> SchemaResult<()> {
        if !price.is_finite() || price < 0.0 {
            return Err(SchemaError::validation_failed(ValidationDetails::out_of_range(
                "price",
                "finite non-negative number",
                price,
            )));
        }
        Ok(())
    }
}

fn has_value(obj: &Map<String, Value>, field: &str) -> bool {
    present(obj, field).is_some()
}

fn present<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

fn integer(value: &Value) -> Option<i128> {
    value
        .as_i64()
        .map(i128::from)
        .or_else(|| value.as_u64().map(i128::from))
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Creates a type mismatch error.
fn type_error(field: &str, expected: &str, actual: &Value) -> SchemaError {
    SchemaError::validation_failed(ValidationDetails::type_mismatch(
        field,
        expected,
        json_type_name(actual),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_book_passes() {
        let doc = json!({
            "title": "The Alchemist",
            "author": "Paulo Coelho",
            "genre": "Fiction",
            "published_year": 1988,
            "price": 16.5,
            "stock": 3,
            "pages": 208
        });
        assert!(BookValidator::validate(&doc).is_ok());
    }

    #[test]
    fn test_missing_required_fields() {
        let err = BookValidator::validate(&json!({"title": "Untitled"})).unwrap_err();
        assert_eq!(err.field(), "author");

        let err = BookValidator::validate(&json!({"title": null, "author": "A"})).unwrap_err();
        assert_eq!(err.field(), "title");

        let err = BookValidator::validate(&json!({"title": "  ", "author": "A"})).unwrap_err();
        assert_eq!(err.details().actual, "empty string");
    }

    #[test]
    fn test_no_type_coercion() {
        let err = BookValidator::validate(&json!({
            "title": "T", "author": "A", "published_year": "1925"
        }))
        .unwrap_err();
        assert_eq!(err.field(), "published_year");
        assert_eq!(err.details().actual, "string");

        let err = BookValidator::validate(&json!({
            "title": "T", "author": "A", "published_year": 1925.5
        }))
        .unwrap_err();
        assert_eq!(err.details().actual, "float");
    }

    #[test]
    fn test_price_and_stock_ranges() {
        let with = |field: &str, value: Value| {
            let mut doc = json!({"title": "T", "author": "A"});
            doc[field] = value;
            BookValidator::validate(&doc)
        };
        assert!(with("price", json!(-1.0)).is_err());
        assert!(with("price", json!(10)).is_ok());
        assert!(with("stock", json!(-2)).is_err());
        assert!(with("stock", json!(5_000_000_000u64)).is_err());
        assert!(BookValidator::check_price(f64::NAN).is_err());
    }

    #[test]
    fn test_nulls_count_as_absent() {
        let doc = json!({"title": "T", "author": "A", "genre": null, "price": null});
        assert!(BookValidator::validate(&doc).is_ok());
    }

    #[test]
    fn test_normalize_drops_null_optionals() {
        let doc = BookValidator::prepare(json!({
            "title": "Circe",
            "author": "Madeline Miller",
            "genre": "Fantasy",
            "price": null,
            "stock": null,
            "series": null
        }))
        .unwrap();
        assert_eq!(
            doc,
            json!({
                "title": "Circe",
                "author": "Madeline Miller",
                "genre": "Fantasy",
                "series": null
            })
        );

        let doc = BookValidator::prepare(json!({
            "title": "Circe",
            "author": "Madeline Miller",
            "stock": null,
            "in_stock": true
        }))
        .unwrap();
        assert_eq!(doc["stock"], json!(1));
    }

    #[test]
    fn test_normalize_legacy_in_stock() {
        let doc = BookValidator::prepare(json!({
            "_id": "abc", "title": "T", "author": "A", "in_stock": true
        }))
        .unwrap();
        assert_eq!(doc, json!({"title": "T", "author": "A", "stock": 1}));

        let doc = BookValidator::prepare(json!({"title": "T", "author": "A", "in_stock": false}))
            .unwrap();
        assert_eq!(doc["stock"], json!(0));

        // An explicit quantity wins over the flag
        let doc = BookValidator::prepare(json!({
            "title": "T", "author": "A", "in_stock": true, "stock": 7
        }))
        .unwrap();
        assert_eq!(doc["stock"], json!(7));
        assert!(doc.get("in_stock").is_none());

        let flagged = json!({"title": "T", "author": "A", "in_stock": "yes"});
        assert!(BookValidator::normalize(flagged).is_err());
    }

    #[test]
    fn test_non_object_rejected() {
        let err = BookValidator::prepare(json!(["not", "a", "book"])).unwrap_err();
        assert_eq!(err.field(), "$root");
    }

    #[test]
    fn test_validate_typed_book() {
        assert!(BookValidator::validate_book(&Book::new("Dune", "Frank Herbert")).is_ok());
        assert!(BookValidator::validate_book(&Book::new("", "Frank Herbert")).is_err());
        let priceless = Book::new("Dune", "F").with_price(f64::INFINITY);
        assert!(BookValidator::validate_book(&priceless).is_err());
    }
}
