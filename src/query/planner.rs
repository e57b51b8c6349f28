//! Query planner
//!
//! Produces deterministic plans for find queries.
//!
//! Access path selection (strict order):
//! 1. Equality predicate on the leading field of an index
//! 2. Range predicate on the leading field of an index
//! 3. Collection scan
//!
//! Ties broken lexicographically by index name. Every predicate is still
//! re-checked against each candidate document, so an index only narrows
//! the candidate set.

use serde_json::Value;

use super::ast::{FilterOp, FindQuery, Predicate, Projection, SortSpec};
use super::errors::{QueryError, QueryResult};
use crate::index::{IndexKey, IndexMetadata};

/// Scan type used by a query plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanType {
    /// Every document in natural order
    CollectionScan,
    /// Equality on a single-field index
    IndexedEquality,
    /// Equality on the leading field of a compound index
    IndexedPrefix,
    /// Range on the leading field of an index
    IndexedRange,
}

impl ScanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::CollectionScan => "COLLECTION_SCAN",
            ScanType::IndexedEquality => "INDEX_EQ",
            ScanType::IndexedPrefix => "INDEX_PREFIX",
            ScanType::IndexedRange => "INDEX_RANGE",
        }
    }
}

/// How candidate documents are obtained
#[derive(Debug, Clone, PartialEq)]
pub enum AccessPath {
    CollectionScan,
    IndexEq {
        index: String,
        value: Value,
    },
    IndexRange {
        index: String,
        lower: Option<Value>,
        upper: Option<Value>,
    },
}

impl AccessPath {
    /// Name of the chosen index, if any
    pub fn index_name(&self) -> Option<&str> {
        match self {
            AccessPath::CollectionScan => None,
            AccessPath::IndexEq { index, .. } | AccessPath::IndexRange { index, .. } => {
                Some(index)
            }
        }
    }
}

/// Immutable query plan (no runtime state)
#[derive(Debug, Clone)]
pub struct QueryPlan {
    /// Candidate access path
    pub access: AccessPath,
    /// Scan type
    pub scan_type: ScanType,
    /// Filter predicates to apply
    pub predicates: Vec<Predicate>,
    /// Projection applied after sort/skip/limit
    pub projection: Option<Projection>,
    /// Sort specification
    pub sort: Option<SortSpec>,
    /// Documents to skip
    pub skip: u64,
    /// Maximum documents to return
    pub limit: Option<u64>,
}

/// Query planner that produces deterministic plans
pub struct QueryPlanner<'a> {
    index_metadata: &'a IndexMetadata,
}

impl<'a> QueryPlanner<'a> {
    /// Creates a new planner
    pub fn new(index_metadata: &'a IndexMetadata) -> Self {
        Self { index_metadata }
    }

    /// Plans a query, returning an immutable plan or error.
    ///
    /// This method is deterministic: same inputs → same plan.
    pub fn plan(&self, query: &FindQuery) -> QueryResult<QueryPlan> {
        Self::validate(query)?;

        let (access, scan_type) = self.select_access_path(query);

        Ok(QueryPlan {
            access,
            scan_type,
            predicates: query.predicates.clone(),
            projection: query.projection.clone(),
            sort: query.sort.clone(),
            skip: query.skip,
            limit: query.limit,
        })
    }

    fn validate(query: &FindQuery) -> QueryResult<()> {
        for pred in &query.predicates {
            if pred.field.is_empty() {
                return Err(QueryError::invalid_field(
                    &pred.field,
                    "field name must not be empty",
                ));
            }
            if let FilterOp::Eq(v)
            | FilterOp::Gt(v)
            | FilterOp::Gte(v)
            | FilterOp::Lt(v)
            | FilterOp::Lte(v) = &pred.op
            {
                if v.is_object() {
                    return Err(QueryError::invalid_field(
                        &pred.field,
                        "operand must not be a document",
                    ));
                }
            }
        }

        if let Some(sort) = &query.sort {
            if sort.field.is_empty() {
                return Err(QueryError::query_invalid("sort field must not be empty"));
            }
        }

        if let Some(projection) = &query.projection {
            if projection.fields.iter().any(|f| f.is_empty()) {
                return Err(QueryError::query_invalid(
                    "projection field must not be empty",
                ));
            }
        }

        if query.limit == Some(0) {
            return Err(QueryError::query_invalid("limit must be positive"));
        }

        Ok(())
    }

    fn select_access_path(&self, query: &FindQuery) -> (AccessPath, ScanType) {
        // Priority 1: indexed equality
        let mut eq_candidates: Vec<(String, bool, &Value)> = Vec::new();
        for pred in &query.predicates {
            if let FilterOp::Eq(value) = &pred.op {
                if !Self::is_seekable(value) {
                    continue;
                }
                for spec in self.index_metadata.leading_on(&pred.field) {
                    eq_candidates.push((spec.name(), spec.is_compound(), value));
                }
            }
        }
        eq_candidates.sort_by(|a, b| a.0.cmp(&b.0));
        if let Some((index, compound, value)) = eq_candidates.into_iter().next() {
            let scan_type = if compound {
                ScanType::IndexedPrefix
            } else {
                ScanType::IndexedEquality
            };
            return (
                AccessPath::IndexEq {
                    index,
                    value: value.clone(),
                },
                scan_type,
            );
        }

        // Priority 2: indexed range
        let mut range_candidates: Vec<(String, &str)> = Vec::new();
        for pred in query.predicates.iter().filter(|p| p.is_range()) {
            if !Self::is_seekable(&pred.op.operand()) {
                continue;
            }
            for spec in self.index_metadata.leading_on(&pred.field) {
                range_candidates.push((spec.name(), pred.field.as_str()));
            }
        }
        range_candidates.sort();
        if let Some((index, field)) = range_candidates.into_iter().next() {
            let (lower, upper) = Self::range_bounds(&query.predicates, field);
            return (
                AccessPath::IndexRange {
                    index,
                    lower,
                    upper,
                },
                ScanType::IndexedRange,
            );
        }

        (AccessPath::CollectionScan, ScanType::CollectionScan)
    }

    /// Inclusive bounds covering every range predicate on `field`.
    ///
    /// Strict comparisons are widened to inclusive ones; the residual
    /// filter removes the boundary values again.
    fn range_bounds(predicates: &[Predicate], field: &str) -> (Option<Value>, Option<Value>) {
        let mut lower = None;
        let mut upper = None;

        for pred in predicates.iter().filter(|p| p.field == field) {
            match &pred.op {
                FilterOp::Gt(v) | FilterOp::Gte(v) if Self::is_seekable(v) => {
                    lower = Some(v.clone())
                }
                FilterOp::Lt(v) | FilterOp::Lte(v) if Self::is_seekable(v) => {
                    upper = Some(v.clone())
                }
                _ => {}
            }
        }

        (lower, upper)
    }

    /// Null never matches a comparison, so it cannot seed an index seek
    fn is_seekable(value: &Value) -> bool {
        !value.is_null() && IndexKey::from_json(value).is_some()
    }
}
