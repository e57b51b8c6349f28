//! Book schema for bookdb
//!
//! The `books` collection has an implicit schema in the document store;
//! here it is the typed `Book` record plus insert-time validation of raw
//! documents.

mod book;
mod errors;
mod validator;

pub use book::Book;
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity, ValidationDetails};
pub use validator::BookValidator;
