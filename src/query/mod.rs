//! Query subsystem for bookdb
//!
//! Find queries are built from an AST of AND-ed predicates, an optional
//! inclusion projection and cursor modifiers (sort, skip, limit). The
//! planner turns a query into an immutable plan with a chosen access path.
//!
//! # Design Principles
//!
//! - Deterministic: same query + same indexes → same plan
//! - Indexes narrow, predicates decide: every candidate is re-filtered
//! - Explicit: no implicit type coercion in predicates

mod ast;
mod errors;
mod explain;
mod planner;

pub use ast::{FilterOp, FindQuery, Predicate, Projection, SortDirection, SortSpec};
pub use errors::{QueryError, QueryErrorCode, QueryResult};
pub use explain::ExplainPlan;
pub use planner::{AccessPath, QueryPlan, QueryPlanner, ScanType};
