use std::path::PathBuf;
use std::time::Duration;

use crate::error::{FetchError, PipelineError, Result};
use crate::utils::constants::{DEFAULT_ENDPOINT, DEFAULT_STORE_FILE, DEFAULT_TIMEOUT_SECS};

/// Explicit pipeline configuration. Nothing in the pipeline reads ambient
/// state (working directory, hardcoded URLs); everything flows through here.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub endpoint_url: String,
    pub api_key: String,
    pub store_path: PathBuf,
    pub request_timeout: Duration,
    /// When true, re-fetch even if a usable snapshot is cached.
    pub refresh: bool,
}

impl PipelineConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            refresh: false,
        }
    }

    pub fn with_endpoint(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = endpoint_url.into();
        self
    }

    pub fn with_store_path(mut self, store_path: impl Into<PathBuf>) -> Self {
        self.store_path = store_path.into();
        self
    }

    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    /// Reject configurations that can never produce a successful fetch.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(PipelineError::Fetch(FetchError::MissingApiKey));
        }
        if reqwest::Url::parse(&self.endpoint_url).is_err() {
            return Err(PipelineError::Fetch(FetchError::InvalidUrl(
                self.endpoint_url.clone(),
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::new("CWA-TEST-KEY");
        assert_eq!(config.endpoint_url, DEFAULT_ENDPOINT);
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(!config.refresh);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let config = PipelineConfig::new("   ");
        assert!(matches!(
            config.validate(),
            Err(PipelineError::Fetch(FetchError::MissingApiKey))
        ));
    }

    #[test]
    fn test_malformed_endpoint_rejected() {
        let config = PipelineConfig::new("key").with_endpoint("not a url");
        assert!(matches!(
            config.validate(),
            Err(PipelineError::Fetch(FetchError::InvalidUrl(_)))
        ));
    }

    #[test]
    fn test_builder_chain() {
        let config = PipelineConfig::new("key")
            .with_endpoint("http://localhost:8080/feed")
            .with_store_path("/tmp/forecast.sqlite")
            .with_timeout(Duration::from_secs(3))
            .with_refresh(true);

        assert_eq!(config.endpoint_url, "http://localhost:8080/feed");
        assert_eq!(config.store_path, PathBuf::from("/tmp/forecast.sqlite"));
        assert!(config.refresh);
    }
}
