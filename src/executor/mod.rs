//! Query Executor subsystem for bookdb
//!
//! The executor consumes plans and produces deterministic results.
//!
//! # Execution Flow (strict order)
//!
//! 1. Use the access path to obtain candidate document ids
//! 2. Read documents from storage
//! 3. Filter documents strictly according to predicates
//! 4. Apply sort (if specified)
//! 5. Apply skip, then limit
//! 6. Apply projection
//! 7. Return ordered results
//!
//! # Invariants
//!
//! - Deterministic execution; ties keep natural order
//! - An index entry without a stored document is fatal

mod errors;
mod executor;
mod filters;
mod projection;
mod result;
mod sorter;

pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult};
pub use executor::{IndexLookup, QueryExecutor, StorageRead};
pub use filters::{values_equal, PredicateFilter};
pub use projection::Projector;
pub use result::{ExecutionResult, ResultDocument};
pub use sorter::ResultSorter;
