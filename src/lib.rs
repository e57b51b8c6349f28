//! bookdb - typed book queries over an embedded document collection
//!
//! A `books` collection of JSON documents with secondary indexes, a
//! planner and executor for find queries, an aggregation pipeline and
//! checksummed snapshots. `catalog::BookQueries` is the query set built
//! on top of it.

pub mod aggregate;
pub mod catalog;
pub mod cli;
pub mod executor;
pub mod index;
pub mod observability;
pub mod query;
pub mod schema;
pub mod storage;
