//! Result sorting for query execution
//!
//! Stable: documents with equal sort keys keep their natural order.

use std::cmp::Ordering;

use serde_json::Value;

use super::result::ResultDocument;
use crate::query::{SortDirection, SortSpec};

/// Sorts result documents and pipeline documents
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts documents according to a single sort specification.
    pub fn sort(documents: &mut [ResultDocument], sort_spec: &SortSpec) {
        let specs = std::slice::from_ref(sort_spec);
        documents.sort_by(|a, b| Self::compare_by(&a.body, &b.body, specs));
    }

    /// Sorts raw documents by several keys, in priority order.
    pub fn sort_values(documents: &mut [Value], specs: &[SortSpec]) {
        documents.sort_by(|a, b| Self::compare_by(a, b, specs));
    }

    fn compare_by(a: &Value, b: &Value, specs: &[SortSpec]) -> Ordering {
        for spec in specs {
            let ordering = Self::compare_values(a.get(&spec.field), b.get(&spec.field));
            let ordering = match spec.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Compares two JSON values for sorting.
    ///
    /// Ordering rules:
    /// - missing = null < number < string < bool
    /// - For same types, natural ordering; integers and floats compare numerically
    pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        static NULL: Value = Value::Null;
        let a = a.unwrap_or(&NULL);
        let b = b.unwrap_or(&NULL);

        let type_order = |v: &Value| -> u8 {
            match v {
                Value::Null => 0,
                Value::Number(_) => 1,
                Value::String(_) => 2,
                Value::Object(_) => 3,
                Value::Array(_) => 4,
                Value::Bool(_) => 5,
            }
        };

        let a_type = type_order(a);
        let b_type = type_order(b);
        if a_type != b_type {
            return a_type.cmp(&b_type);
        }

        match (a, b) {
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::Number(x), Value::Number(y)) => {
                if let (Some(xi), Some(yi)) = (x.as_i64(), y.as_i64()) {
                    return xi.cmp(&yi);
                }
                let xf = x.as_f64().unwrap_or(0.0);
                let yf = y.as_f64().unwrap_or(0.0);
                xf.partial_cmp(&yf).unwrap_or(Ordering::Equal)
            }
            (Value::String(x), Value::String(y)) => x.cmp(y),
            // Arrays and objects are not compared
            _ => Ordering::Equal,
        }
    }
}
