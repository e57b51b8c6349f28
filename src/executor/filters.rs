//! Predicate filtering for query execution
//!
//! Filters documents strictly according to predicates.
//! No type coercion: numbers compare with numbers (integer and float alike),
//! strings with strings. A missing or null field matches nothing except
//! `$exists: false`.

use std::cmp::Ordering;

use serde_json::Value;

use crate::query::{FilterOp, Predicate};

/// Evaluates predicates against documents
pub struct PredicateFilter;

impl PredicateFilter {
    /// Checks if a document matches all predicates
    pub fn matches(document: &Value, predicates: &[Predicate]) -> bool {
        predicates
            .iter()
            .all(|pred| Self::matches_predicate(document, pred))
    }

    /// Checks if a document matches a single predicate
    pub fn matches_predicate(document: &Value, predicate: &Predicate) -> bool {
        let field_value = document.get(&predicate.field).filter(|v| !v.is_null());

        let actual = match (field_value, &predicate.op) {
            (present, FilterOp::Exists(expected)) => return present.is_some() == *expected,
            (None, _) => return false,
            (Some(v), _) => v,
        };

        match &predicate.op {
            FilterOp::Eq(expected) => values_equal(actual, expected),
            FilterOp::Gt(bound) => compare_scalars(actual, bound) == Some(Ordering::Greater),
            FilterOp::Gte(bound) => matches!(
                compare_scalars(actual, bound),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lt(bound) => compare_scalars(actual, bound) == Some(Ordering::Less),
            FilterOp::Lte(bound) => matches!(
                compare_scalars(actual, bound),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOp::Exists(expected) => *expected,
        }
    }
}

/// Equality without coercion; `19.99 == 19.99` and `5 == 5.0`
pub fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(af), Some(bf)) => af == bf,
            _ => a == b,
        },
        _ => actual == expected,
    }
}

/// Orders two values of the same scalar kind. Mixed kinds do not compare.
fn compare_scalars(actual: &Value, bound: &Value) -> Option<Ordering> {
    match (actual, bound) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(ai), Some(bi)) = (a.as_i64(), b.as_i64()) {
                return Some(ai.cmp(&bi));
            }
            a.as_f64()?.partial_cmp(&b.as_f64()?)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
