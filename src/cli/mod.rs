//! Command-line interface for casefetch.

mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// casefetch - Delhi High Court case lookup
#[derive(Parser)]
#[command(name = "casefetch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web UI server
    #[command(alias = "web")]
    Serve {
        /// Port to listen on (overrides config)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Look up a case by number, e.g. "W.P.(C) 1234/2023"
    #[command(alias = "s")]
    Search {
        #[arg(required = true)]
        case_number: Vec<String>,
        /// Query the court website even if the case is stored
        #[arg(long)]
        refresh: bool,
    },

    /// Find cases by petitioner or respondent name
    #[command(alias = "p")]
    Party {
        #[arg(required = true)]
        name: Vec<String>,
        /// Query the court website even if stored matches exist
        #[arg(long)]
        refresh: bool,
    },

    /// Show a stored case and its change history
    #[command(alias = "i", alias = "info")]
    Show {
        #[arg(required = true)]
        case_number: Vec<String>,
    },

    /// List stored cases, newest first
    #[command(alias = "ls")]
    Recent {
        /// Number of cases to show
        #[arg(default_value = "10")]
        limit: u64,
        /// Only cases with this status (e.g. pending, disposed)
        #[arg(long)]
        status: Option<String>,
        /// Filed on or after this date (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        /// Filed on or before this date (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },

    /// Show search statistics
    Stats,

    /// Check that the court website is reachable
    #[command(alias = "test-scraper")]
    Check,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
