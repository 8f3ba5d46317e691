use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Network-level failure while calling the upstream forecast API.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("forecast endpoint returned HTTP {status}")]
    Status { status: reqwest::StatusCode },

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("API key must not be empty")]
    MissingApiKey,
}

/// The payload's top-level structure is unrecognizable. Individual malformed
/// records never produce this; they are skipped and counted instead.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload root is not a JSON object")]
    UnexpectedRoot,

    #[error("no forecast location array found in payload")]
    MissingLocations,
}

/// I/O or SQLite failure on the local store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("store failed: {0}")]
    Store(#[from] StoreError),

    #[error("no viable data source: {cause}")]
    NoData {
        #[source]
        cause: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Wrap a cold-start failure: the fetch path failed and there is no
    /// cached snapshot to fall back to.
    pub fn no_data(cause: PipelineError) -> Self {
        PipelineError::NoData {
            cause: Box::new(cause),
        }
    }
}
