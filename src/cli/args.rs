//! CLI argument definitions using clap
//!
//! `bookdb [--config <path>] <command>`

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// bookdb - typed queries over a books collection
#[derive(Parser, Debug)]
#[command(name = "bookdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./bookdb.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Books of a genre
    ByGenre { genre: String },

    /// Books published strictly after a year
    PublishedAfter {
        #[arg(allow_negative_numbers = true)]
        year: i32,
    },

    /// Books by an author
    ByAuthor { author: String },

    /// In-stock books published after a year (title, author, price)
    InStockAfter {
        #[arg(allow_negative_numbers = true)]
        year: i32,
    },

    /// Set the price of the first book with this title
    UpdatePrice { title: String, price: f64 },

    /// Delete the first book with this title
    Delete { title: String },

    /// One page of in-stock books published after 2010
    ListPage {
        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: u64,

        /// Books per page (defaults to the configured page size)
        #[arg(long)]
        page_size: Option<u64>,

        /// Field to sort by
        #[arg(long, default_value = "price")]
        sort: String,

        /// 1 for ascending, -1 for descending
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        direction: i32,
    },

    /// Average price per genre, highest first
    AvgPriceByGenre,

    /// Author with the most books
    TopAuthor,

    /// Book counts per publication decade
    Decades,

    /// Create the title and author/year indexes
    CreateIndexes,

    /// Show the plan chosen for a query
    Explain {
        #[arg(value_enum)]
        query: ExplainTarget,
        value: String,
    },

    /// Insert books from a JSON array file
    Import { file: PathBuf },
}

impl Command {
    /// Stable command name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::ByGenre { .. } => "by-genre",
            Command::PublishedAfter { .. } => "published-after",
            Command::ByAuthor { .. } => "by-author",
            Command::InStockAfter { .. } => "in-stock-after",
            Command::UpdatePrice { .. } => "update-price",
            Command::Delete { .. } => "delete",
            Command::ListPage { .. } => "list-page",
            Command::AvgPriceByGenre => "avg-price-by-genre",
            Command::TopAuthor => "top-author",
            Command::Decades => "decades",
            Command::CreateIndexes => "create-indexes",
            Command::Explain { .. } => "explain",
            Command::Import { .. } => "import",
        }
    }
}

/// Queries that can be explained
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplainTarget {
    ByGenre,
    PublishedAfter,
    ByAuthor,
    ByTitle,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_page_descending() {
        let cli = Cli::try_parse_from([
            "bookdb", "--config", "books.json", "list-page", "--page", "2", "--direction", "-1",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("books.json"));
        assert_eq!(
            cli.command,
            Command::ListPage {
                page: 2,
                page_size: None,
                sort: "price".into(),
                direction: -1,
            }
        );
    }

    #[test]
    fn test_parse_explain_and_default_config() {
        let cli = Cli::try_parse_from(["bookdb", "explain", "by-title", "Moby Dick"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("./bookdb.json"));
        assert_eq!(
            cli.command,
            Command::Explain {
                query: ExplainTarget::ByTitle,
                value: "Moby Dick".into(),
            }
        );
        assert_eq!(cli.command.name(), "explain");
    }

    #[test]
    fn test_parse_rejects_bad_year() {
        assert!(Cli::try_parse_from(["bookdb", "published-after", "nineteen"]).is_err());
    }
}
