//! Aggregation subsystem for bookdb
//!
//! Pipelines of `$match`, `$group`, `$sort`, `$limit` and `$project`
//! stages evaluated over documents in natural order.
//!
//! # Invariants
//!
//! - Pipelines are validated before any stage runs
//! - Group output follows first-seen order of the group key
//! - Sorting is stable, so ties keep first-seen order

mod errors;
mod pipeline;
mod stage;

pub use errors::{AggregateError, AggregateErrorCode, AggregateResult};
pub use pipeline::Pipeline;
pub use stage::{decade_of, Accumulator, GroupKey, ProjectField, Stage};
