//! CLI command implementations
//!
//! Every command opens the snapshot named by the config, runs one query
//! and prints one JSON response. Mutating commands write the snapshot back
//! when they changed something.

use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::catalog::BookQueries;
use crate::observability::Logger;

use super::args::{Cli, Command, ExplainTarget};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Main entry point for CLI
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli)
}

/// Run a parsed command and write its response to stdout
pub fn run_command(cli: Cli) -> CliResult<()> {
    let request_id = Uuid::new_v4().to_string();
    let command_name = cli.command.name();

    let outcome = Config::load(&cli.config).and_then(|config| {
        Logger::set_min_severity(config.min_severity());
        Logger::info(
            "CLI_COMMAND",
            &[("command", command_name), ("request_id", request_id.as_str())],
        );
        execute(&config, cli.command)
    });

    match outcome {
        Ok(data) => write_response(data),
        Err(err) => {
            Logger::error(
                "CLI_COMMAND_FAILED",
                &[
                    ("code", err.code_str()),
                    ("command", command_name),
                    ("request_id", request_id.as_str()),
                ],
            );
            write_error(err.code_str(), err.message())?;
            Err(err)
        }
    }
}

/// Open the collection and run one command, returning the response data
pub fn execute(config: &Config, command: Command) -> CliResult<Value> {
    let mut books = open_books(config)?;

    match command {
        Command::ByGenre { genre } => to_data(books.find_by_genre(&genre)?),
        Command::PublishedAfter { year } => to_data(books.find_published_after(year)?),
        Command::ByAuthor { author } => to_data(books.find_by_author(&author)?),
        Command::InStockAfter { year } => to_data(books.find_in_stock_after_year(year)?),

        Command::UpdatePrice { title, price } => {
            let outcome = books.update_price(&title, price)?;
            if outcome.modified_count > 0 {
                books.save(&config.data_file)?;
            }
            to_data(outcome)
        }

        Command::Delete { title } => {
            let outcome = books.delete_by_title(&title)?;
            if outcome.deleted_count > 0 {
                books.save(&config.data_file)?;
            }
            to_data(outcome)
        }

        Command::ListPage {
            page,
            page_size,
            sort,
            direction,
        } => {
            let page_size = page_size.unwrap_or(config.page_size);
            to_data(books.list_page(page, page_size, &sort, direction)?)
        }

        Command::AvgPriceByGenre => to_data(books.average_price_by_genre()?),
        Command::TopAuthor => to_data(books.author_with_most_books()?),
        Command::Decades => to_data(books.counts_by_decade()?),

        Command::CreateIndexes => {
            let names = books.ensure_indexes()?;
            Ok(json!({ "indexes": names }))
        }

        Command::Explain { query, value } => {
            let plan = match query {
                ExplainTarget::ByGenre => books.explain_by_genre(&value),
                ExplainTarget::PublishedAfter => books.explain_published_after(parse_year(&value)?),
                ExplainTarget::ByAuthor => books.explain_by_author(&value),
                ExplainTarget::ByTitle => books.explain_by_title(&value),
            };
            to_data(plan)
        }

        Command::Import { file } => {
            let ids = books.import_json_array(&file)?;
            books.save(&config.data_file)?;
            Ok(json!({ "inserted": ids.len() }))
        }
    }
}

fn open_books(config: &Config) -> CliResult<BookQueries> {
    let mut books = BookQueries::open(&config.data_file)?;
    if config.create_indexes_on_open {
        books.ensure_indexes()?;
    }
    Ok(books)
}

fn parse_year(value: &str) -> CliResult<i32> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::invalid_argument(format!("'{}' is not a year", value)))
}

fn to_data<T: Serialize>(data: T) -> CliResult<Value> {
    Ok(serde_json::to_value(data)?)
}
