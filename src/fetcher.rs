use std::time::Duration;

use reqwest::Client;

use crate::error::FetchError;
use crate::utils::constants::{
    DOWNLOAD_TYPE_WEB, FORMAT_JSON, PARAM_AUTHORIZATION, PARAM_DOWNLOAD_TYPE, PARAM_FORMAT,
    USER_AGENT,
};

/// Thin HTTP client for the CWA file API. One GET per call, no retries;
/// retry and fallback policy live in the pipeline.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    endpoint_url: String,
    api_key: String,
}

impl Fetcher {
    pub fn new(
        endpoint_url: impl Into<String>,
        api_key: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, FetchError> {
        let endpoint_url = endpoint_url.into();
        let api_key = api_key.into();

        if api_key.trim().is_empty() {
            return Err(FetchError::MissingApiKey);
        }
        if reqwest::Url::parse(&endpoint_url).is_err() {
            return Err(FetchError::InvalidUrl(endpoint_url));
        }

        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint_url,
            api_key,
        })
    }

    /// Fetch the raw forecast payload. Returns the body as text; decoding is
    /// the parser's job so a schema change upstream surfaces as a parse
    /// problem, not a fetch problem.
    pub async fn fetch(&self) -> Result<String, FetchError> {
        tracing::debug!(endpoint = %self.endpoint_url, "requesting forecast feed");

        let response = self
            .client
            .get(&self.endpoint_url)
            .query(&[
                (PARAM_AUTHORIZATION, self.api_key.as_str()),
                (PARAM_DOWNLOAD_TYPE, DOWNLOAD_TYPE_WEB),
                (PARAM_FORMAT, FORMAT_JSON),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }

        Ok(response.text().await?)
    }
}
