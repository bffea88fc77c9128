use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use pointer::app::SortColumn;

#[derive(Parser)]
#[command(name = "pointer")]
#[command(about = "Track dividend tickers and see what a fixed budget buys")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, default_value = "pointer.json")]
    pub config: PathBuf,

    /// Override the ticker list file from the configuration
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show registered tickers
    List,

    /// Register a ticker (e.g. petr4 or PETR4.SA)
    Add { ticker: String },

    /// Rename a registered ticker
    Rename { old: String, new: String },

    /// Remove a registered ticker
    Remove { ticker: String },

    /// Fetch prices and dividends for every registered ticker
    Scan {
        /// Amount available to invest per ticker
        #[arg(short, long)]
        budget: Option<f64>,

        /// Start of the dividend window (YYYY-MM-DD); defaults to a trailing year
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Maximum concurrent fetches
        #[arg(short, long)]
        workers: Option<usize>,

        /// Column to order the final table by
        #[arg(long, value_enum)]
        sort: Option<SortColumn>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
    },
}
