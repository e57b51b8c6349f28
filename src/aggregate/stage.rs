//! Pipeline stage definitions
//!
//! Stages mirror the document-database operators they stand for:
//! `$match`, `$group` (with `$sum: 1` and `$avg`), `$sort`, `$limit` and
//! `$project`. Decade bucketing is the `$floor`/`$divide` expression
//! `floor(field / 10) * 10`.

use serde_json::{Number, Value};

use crate::query::{Predicate, SortSpec};

/// How a `$group` stage derives the `_id` of each group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKey {
    /// The value of a field; missing and null share one group
    Field(String),
    /// `floor(field / 10) * 10`; non-numeric values group under null
    Decade(String),
}

impl GroupKey {
    /// Source field of the key
    pub fn field(&self) -> &str {
        match self {
            GroupKey::Field(f) | GroupKey::Decade(f) => f,
        }
    }

    /// Evaluates the key against a document
    pub fn evaluate(&self, document: &Value) -> Value {
        let value = document.get(self.field()).cloned().unwrap_or(Value::Null);
        match self {
            GroupKey::Field(_) => value,
            GroupKey::Decade(_) => decade_of(&value),
        }
    }
}

/// Decade bucket of a numeric value. Integers stay integers.
pub fn decade_of(value: &Value) -> Value {
    let n = match value {
        Value::Number(n) => n,
        _ => return Value::Null,
    };
    // Integers whose decade does not fit i64 fall through to the float path
    if let Some(decade) = n.as_i64().and_then(|i| i.div_euclid(10).checked_mul(10)) {
        return Value::from(decade);
    }
    n.as_f64()
        .and_then(|f| Number::from_f64((f / 10.0).floor() * 10.0))
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Group accumulators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accumulator {
    /// `$sum: 1`
    Count,
    /// `$avg` of a field; non-numeric values are ignored
    Avg(String),
}

/// One output field of a `$project` stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectField {
    /// Keep a field under its own name
    Include(String),
    /// Emit `source` under the name `output`
    Alias { output: String, source: String },
}

impl ProjectField {
    /// Name of the field in the output document
    pub fn output(&self) -> &str {
        match self {
            ProjectField::Include(f) => f,
            ProjectField::Alias { output, .. } => output,
        }
    }

    /// Name of the field read from the input document
    pub fn source(&self) -> &str {
        match self {
            ProjectField::Include(f) => f,
            ProjectField::Alias { source, .. } => source,
        }
    }
}

/// A single pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Keep documents matching all predicates
    Match(Vec<Predicate>),
    /// Group by key, computing named accumulators
    Group {
        key: GroupKey,
        accumulators: Vec<(String, Accumulator)>,
    },
    /// Stable multi-key sort
    Sort(Vec<SortSpec>),
    /// Keep the first n documents
    Limit(u64),
    /// Reshape documents
    Project {
        fields: Vec<ProjectField>,
        include_id: bool,
    },
}

impl Stage {
    /// Operator name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Match(_) => "$match",
            Stage::Group { .. } => "$group",
            Stage::Sort(_) => "$sort",
            Stage::Limit(_) => "$limit",
            Stage::Project { .. } => "$project",
        }
    }
}
