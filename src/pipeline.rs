//! Pipeline orchestration: decide between a network fetch and a cache read,
//! and tag the returned dataset so callers never have to infer freshness.
//!
//! The state machine has two states. Cold start (no usable store) must fetch
//! and has no fallback; with a usable store the default path reads the cache,
//! and an explicit refresh re-fetches but falls back to the cached snapshot
//! when the fetch path fails.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::fetcher::Fetcher;
use crate::models::{Dataset, NormalizedBatch};
use crate::parser;
use crate::store::Store;

/// A dataset plus where it came from on this run.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Fetched from the network this run and persisted.
    Fresh { dataset: Dataset, skipped: usize },
    /// Served from the local store without touching the network.
    Cached(Dataset),
    /// Refresh was requested and failed; this is the previous snapshot.
    Stale {
        dataset: Dataset,
        cause: PipelineError,
    },
}

impl PipelineOutcome {
    pub fn dataset(&self) -> &Dataset {
        match self {
            PipelineOutcome::Fresh { dataset, .. } => dataset,
            PipelineOutcome::Cached(dataset) => dataset,
            PipelineOutcome::Stale { dataset, .. } => dataset,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, PipelineOutcome::Stale { .. })
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    fetcher: Fetcher,
    store: Store,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = Fetcher::new(
            config.endpoint_url.clone(),
            config.api_key.clone(),
            config.request_timeout,
        )
        .map_err(PipelineError::Fetch)?;
        let store = Store::new(config.store_path.clone());

        Ok(Self {
            config,
            fetcher,
            store,
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Run one pipeline cycle. The store is the single source of truth
    /// afterwards regardless of which path was taken.
    pub async fn run(&self) -> Result<PipelineOutcome> {
        let cached = self.store.exists().map_err(PipelineError::Store)?;

        if cached && !self.config.refresh {
            tracing::debug!("usable snapshot present, serving from store");
            let dataset = self.store.read_all().map_err(PipelineError::Store)?;
            return Ok(PipelineOutcome::Cached(dataset));
        }

        match self.fetch_and_persist().await {
            Ok((dataset, skipped)) => Ok(PipelineOutcome::Fresh { dataset, skipped }),
            Err(cause) if cached => {
                // Stale-but-available: the previous snapshot still serves.
                tracing::warn!(error = %cause, "refresh failed, falling back to cached snapshot");
                let dataset = self.store.read_all().map_err(PipelineError::Store)?;
                Ok(PipelineOutcome::Stale { dataset, cause })
            }
            Err(cause) => Err(PipelineError::no_data(cause)),
        }
    }

    async fn fetch_and_persist(&self) -> Result<(Dataset, usize)> {
        let raw = self.fetcher.fetch().await.map_err(PipelineError::Fetch)?;
        let NormalizedBatch {
            locations,
            readings,
            skipped,
        } = parser::normalize(&raw).map_err(PipelineError::Parse)?;

        // Locations first so the readings' foreign keys resolve.
        self.store
            .upsert_locations(&locations)
            .map_err(PipelineError::Store)?;
        self.store
            .upsert_readings(&readings)
            .map_err(PipelineError::Store)?;

        let dataset = self.store.read_all().map_err(PipelineError::Store)?;
        Ok((dataset, skipped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_payload() -> String {
        serde_json::json!({
            "cwaopendata": {
                "resources": {
                    "resource": {
                        "data": {
                            "agrWeatherForecasts": {
                                "weatherForecasts": {
                                    "location": [{
                                        "locationName": "北部地區",
                                        "weatherElements": {
                                            "MaxT": {"daily": [
                                                {"dataDate": "2025-08-24", "temperature": "33.0"}
                                            ]},
                                            "MinT": {"daily": [
                                                {"dataDate": "2025-08-24", "temperature": "24.0"}
                                            ]}
                                        }
                                    }]
                                }
                            }
                        }
                    }
                }
            }
        })
        .to_string()
    }

    fn pipeline_against(server: &MockServer, dir: &TempDir, refresh: bool) -> Pipeline {
        let config = PipelineConfig::new("CWA-TEST-KEY")
            .with_endpoint(server.uri())
            .with_store_path(dir.path().join("forecast.sqlite"))
            .with_timeout(Duration::from_secs(2))
            .with_refresh(refresh);
        Pipeline::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_cold_start_fetches_and_persists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(sample_payload()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_against(&server, &dir, false);

        let outcome = pipeline.run().await.unwrap();
        match outcome {
            PipelineOutcome::Fresh { dataset, skipped } => {
                assert_eq!(dataset.len(), 1);
                assert_eq!(skipped, 0);
            }
            other => panic!("expected fresh outcome, got {:?}", other),
        }
        assert!(pipeline.store().exists().unwrap());
    }

    #[tokio::test]
    async fn test_cached_state_serves_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(sample_payload()))
            .expect(1) // only the cold-start run may hit the network
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_against(&server, &dir, false);

        pipeline.run().await.unwrap();
        let second = pipeline.run().await.unwrap();
        assert!(matches!(second, PipelineOutcome::Cached(_)));
        assert_eq!(second.dataset().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_falls_back_to_stale() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(sample_payload()))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let warm = pipeline_against(&server, &dir, false);
        let baseline = warm.run().await.unwrap();

        let refresh = pipeline_against(&server, &dir, true);
        let outcome = refresh.run().await.unwrap();
        match outcome {
            PipelineOutcome::Stale { dataset, cause } => {
                assert_eq!(&dataset, baseline.dataset());
                assert!(matches!(cause, PipelineError::Fetch(_)));
            }
            other => panic!("expected stale fallback, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cold_start_failure_is_terminal_and_store_stays_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_against(&server, &dir, false);

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, PipelineError::NoData { .. }));
        assert!(!pipeline.store().exists().unwrap());
    }

    #[tokio::test]
    async fn test_refresh_overwrites_matching_keys() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(sample_payload()))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        let updated = sample_payload().replace("33.0", "35.5");
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(updated))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let warm = pipeline_against(&server, &dir, false);
        warm.run().await.unwrap();

        let refresh = pipeline_against(&server, &dir, true);
        let outcome = refresh.run().await.unwrap();

        let dataset = outcome.dataset();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.rows[0].max_temp, Some(35.5));
    }

    #[tokio::test]
    async fn test_unrecognizable_payload_on_cold_start_is_parse_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"unexpected": true}"#))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_against(&server, &dir, false);

        let err = pipeline.run().await.unwrap_err();
        match err {
            PipelineError::NoData { cause } => {
                assert!(matches!(*cause, PipelineError::Parse(_)))
            }
            other => panic!("expected NoData, got {:?}", other),
        }
    }
}
