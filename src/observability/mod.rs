//! Observability subsystem for bookdb
//!
//! Structured JSON logging to stderr and begin/complete scopes around
//! queries and snapshot I/O.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! ```ignore
//! use bookdb::observability::{Logger, ObservationScope};
//!
//! Logger::info("QUERY_COMPLETE", &[("returned", "5")]);
//!
//! let scope = ObservationScope::new("SNAPSHOT_LOAD");
//! // ... do work ...
//! scope.complete();
//! ```

mod logger;
mod scope;

pub use logger::{Logger, Severity};
pub use scope::ObservationScope;
