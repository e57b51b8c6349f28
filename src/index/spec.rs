//! Index declarations
//!
//! An index is declared as an ordered field-to-direction mapping, the same
//! shape as `createIndex({ author: 1, published_year: 1 })`.

use serde_json::Value;

use super::btree::IndexKey;
use super::errors::{IndexError, IndexResult};
use crate::query::SortDirection;

/// One component of an index declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexField {
    pub name: String,
    pub direction: SortDirection,
}

/// Ordered field list of a single-field or compound index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    fields: Vec<IndexField>,
}

impl IndexSpec {
    /// Builds a spec from `(field, direction)` pairs.
    ///
    /// Directions use the numeric form. Only ascending (`1`) indexes are
    /// supported; fields must be non-empty and distinct.
    pub fn new<I, S>(fields: I) -> IndexResult<Self>
    where
        I: IntoIterator<Item = (S, i32)>,
        S: Into<String>,
    {
        let mut parsed: Vec<IndexField> = Vec::new();

        for (name, direction) in fields {
            let name = name.into();
            if name.is_empty() {
                return Err(IndexError::invalid_spec("index field name must not be empty"));
            }
            if name == "_id" {
                return Err(IndexError::invalid_spec("_id is indexed implicitly"));
            }
            if parsed.iter().any(|f| f.name == name) {
                return Err(IndexError::invalid_spec(format!(
                    "field '{}' appears twice",
                    name
                )));
            }
            let direction = match SortDirection::from_i32(direction) {
                Some(SortDirection::Asc) => SortDirection::Asc,
                Some(SortDirection::Desc) => {
                    return Err(IndexError::invalid_spec(format!(
                        "descending index on '{}' is not supported",
                        name
                    )))
                }
                None => {
                    return Err(IndexError::invalid_spec(format!(
                        "invalid direction {} for '{}'",
                        direction, name
                    )))
                }
            };
            parsed.push(IndexField { name, direction });
        }

        if parsed.is_empty() {
            return Err(IndexError::invalid_spec("index must name at least one field"));
        }

        Ok(Self { fields: parsed })
    }

    /// Ascending index over the given fields
    pub fn ascending<I, S>(fields: I) -> IndexResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(fields.into_iter().map(|f| (f, 1)))
    }

    /// Index name, e.g. `author_1_published_year_1`
    pub fn name(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("{}_{}", f.name, f.direction.as_i32()))
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Declared fields in order
    pub fn fields(&self) -> &[IndexField] {
        &self.fields
    }

    /// The field an index scan can seek on
    pub fn leading_field(&self) -> &str {
        &self.fields[0].name
    }

    /// Returns true for indexes over more than one field
    pub fn is_compound(&self) -> bool {
        self.fields.len() > 1
    }

    /// Builds the key tuple of a document for this index
    pub fn key_for(&self, document: &Value) -> Vec<IndexKey> {
        self.fields
            .iter()
            .map(|f| IndexKey::for_field(document, &f.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_index_names() {
        let title = IndexSpec::ascending(["title"]).unwrap();
        assert_eq!(title.name(), "title_1");
        assert!(!title.is_compound());

        let compound = IndexSpec::new([("author", 1), ("published_year", 1)]).unwrap();
        assert_eq!(compound.name(), "author_1_published_year_1");
        assert!(compound.is_compound());
        assert_eq!(compound.leading_field(), "author");
    }

    #[test]
    fn test_invalid_specs_rejected() {
        assert!(IndexSpec::ascending(Vec::<String>::new()).is_err());
        assert!(IndexSpec::ascending([""]).is_err());
        assert!(IndexSpec::ascending(["_id"]).is_err());
        assert!(IndexSpec::ascending(["title", "title"]).is_err());
        assert!(IndexSpec::new([("title", -1)]).is_err());
        assert!(IndexSpec::new([("title", 2)]).is_err());
    }

    #[test]
    fn test_key_for_document() {
        let spec = IndexSpec::ascending(["author", "published_year"]).unwrap();
        let key = spec.key_for(&json!({"author": "Herman Melville", "published_year": 1851}));
        assert_eq!(
            key,
            vec![
                IndexKey::from_string("Herman Melville"),
                IndexKey::from_f64(1851.0)
            ]
        );

        let key = spec.key_for(&json!({"author": "Anonymous"}));
        assert_eq!(key[1], IndexKey::Missing);
    }
}
