pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod store;
pub mod utils;

pub use config::PipelineConfig;
pub use error::{FetchError, ParseError, PipelineError, Result, StoreError};
pub use pipeline::{Pipeline, PipelineOutcome};
