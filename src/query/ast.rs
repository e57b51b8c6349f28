//! Query AST structures
//!
//! Defines the find-query representation consumed by the planner, the
//! executor and the aggregation `$match` stage.

use serde_json::Value;

/// Filter operation types
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// Equality: field = value
    Eq(Value),
    /// Greater than: field > value
    Gt(Value),
    /// Greater than or equal: field >= value
    Gte(Value),
    /// Less than: field < value
    Lt(Value),
    /// Less than or equal: field <= value
    Lte(Value),
    /// Presence check. Null counts as absent.
    Exists(bool),
}

impl FilterOp {
    /// Returns true if this is an equality operation
    pub fn is_equality(&self) -> bool {
        matches!(self, FilterOp::Eq(_))
    }

    /// Returns true if this is a range operation
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            FilterOp::Gt(_) | FilterOp::Gte(_) | FilterOp::Lt(_) | FilterOp::Lte(_)
        )
    }

    /// Returns the operator name for explain output
    pub fn op_name(&self) -> &'static str {
        match self {
            FilterOp::Eq(_) => "$eq",
            FilterOp::Gt(_) => "$gt",
            FilterOp::Gte(_) => "$gte",
            FilterOp::Lt(_) => "$lt",
            FilterOp::Lte(_) => "$lte",
            FilterOp::Exists(_) => "$exists",
        }
    }

    /// Returns the operand rendered as JSON
    pub fn operand(&self) -> Value {
        match self {
            FilterOp::Eq(v)
            | FilterOp::Gt(v)
            | FilterOp::Gte(v)
            | FilterOp::Lt(v)
            | FilterOp::Lte(v) => v.clone(),
            FilterOp::Exists(present) => Value::Bool(*present),
        }
    }
}

/// A single predicate (field + operation)
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Field name
    pub field: String,
    /// Filter operation
    pub op: FilterOp,
}

impl Predicate {
    /// Create an equality predicate
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Eq(value.into()),
        }
    }

    /// Create a range predicate (gt)
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Gt(value.into()),
        }
    }

    /// Create a range predicate (gte)
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Gte(value.into()),
        }
    }

    /// Create a range predicate (lt)
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Lt(value.into()),
        }
    }

    /// Create a range predicate (lte)
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Lte(value.into()),
        }
    }

    /// Create an existence predicate
    pub fn exists(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Exists(true),
        }
    }

    /// Create a non-existence predicate
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Exists(false),
        }
    }

    /// Returns true if this is an equality predicate
    pub fn is_equality(&self) -> bool {
        self.op.is_equality()
    }

    /// Returns true if this is a range predicate
    pub fn is_range(&self) -> bool {
        self.op.is_range()
    }
}

/// Sort direction, written as `1` / `-1` in index and sort documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Parses the numeric form used by sort and index documents.
    pub fn from_i32(direction: i32) -> Option<Self> {
        match direction {
            1 => Some(SortDirection::Asc),
            -1 => Some(SortDirection::Desc),
            _ => None,
        }
    }

    /// Returns the numeric form (`1` or `-1`)
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Sort specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Field to sort by
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// Inclusion projection.
///
/// Only listed fields are returned. The document identifier is returned
/// as `_id` unless suppressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// Fields to include, in output order
    pub fields: Vec<String>,
    /// Whether `_id` is part of the output
    pub include_id: bool,
}

impl Projection {
    /// Projection on the given fields, `_id` included
    pub fn include<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            include_id: true,
        }
    }

    /// Suppresses `_id` in the output
    pub fn without_id(mut self) -> Self {
        self.include_id = false;
        self
    }
}

/// Find query: filter, projection and cursor modifiers
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    /// Filter predicates (all combined with AND)
    pub predicates: Vec<Predicate>,
    /// Projection (None returns whole documents)
    pub projection: Option<Projection>,
    /// Sort specification
    pub sort: Option<SortSpec>,
    /// Documents to skip after sorting
    pub skip: u64,
    /// Maximum documents to return (None = unbounded)
    pub limit: Option<u64>,
}

impl FindQuery {
    /// Creates an empty query matching every document
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Adds an equality filter
    pub fn filter_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_predicate(Predicate::eq(field, value))
    }

    /// Sets the projection
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Sets the sort specification
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets the number of documents to skip
    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    /// Sets the limit
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}
