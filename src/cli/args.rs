use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::constants::{DEFAULT_ENDPOINT, DEFAULT_STORE_FILE, DEFAULT_TIMEOUT_SECS};

#[derive(Parser)]
#[command(name = "cwa-forecast")]
#[command(about = "CWA agricultural weekly forecast fetcher with SQLite caching")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline: fetch the feed on cold start, otherwise serve the
    /// cached snapshot
    Sync {
        #[arg(long, help = "Re-fetch even if a usable snapshot is cached")]
        refresh: bool,

        #[arg(long, env = "CWA_API_KEY", help = "CWA OpenData API key")]
        api_key: String,

        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        endpoint: String,

        #[arg(long, default_value = DEFAULT_STORE_FILE, help = "SQLite store path")]
        store: PathBuf,

        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, help = "Request timeout in seconds")]
        timeout_secs: u64,
    },

    /// Print the cached dataset without touching the network
    Show {
        #[arg(long, default_value = DEFAULT_STORE_FILE, help = "SQLite store path")]
        store: PathBuf,

        #[arg(long, help = "Only rows for this forecast date (YYYY-MM-DD)")]
        date: Option<NaiveDate>,

        #[arg(long, help = "Only rows for this region name")]
        region: Option<String>,

        #[arg(long, default_value = "0", help = "Maximum rows to print (0 = all)")]
        limit: usize,
    },
}
