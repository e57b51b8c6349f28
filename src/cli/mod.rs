//! Command-line interface for bookdb
//!
//! One command per invocation, one JSON response on stdout:
//! - by-genre, published-after, by-author, in-stock-after
//! - update-price, delete
//! - list-page, avg-price-by-genre, top-author, decades
//! - create-indexes, explain, import

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command, ExplainTarget};
pub use commands::{execute, run, run_command};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_envelope, write_error, write_response};
