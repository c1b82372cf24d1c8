//! Discovery-based, fail-soft client for the stats service.

use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use crate::api::dto::hit::HitRequest;
use crate::api::dto::stats::ViewStatsDto;
use crate::client::discovery::{
    ConsulServiceLocator, RetryPolicy, ServiceInstance, ServiceLocator, StaticServiceLocator,
    resolve_first,
};
use crate::client::error::{StatsClientError, StatsOutcome};
use crate::client::request::StatsRequest;
use crate::config::{DiscoverySource, StatsClientConfig};
use crate::domain::entities::{NewHit, ViewStats};

/// What the main application needs from the stats service.
///
/// Neither method can fail: statistics are a non-critical enhancement, so
/// every failure degrades to "nothing recorded" or "no data".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsApi: Send + Sync {
    /// Records a hit, best effort. Failures are logged and swallowed.
    async fn post_hit(&self, hit: NewHit);

    /// Fetches aggregated counts. Invalid requests and failures yield an
    /// empty vector.
    async fn get_stats(&self, request: StatsRequest) -> Vec<ViewStats>;
}

/// HTTP client that locates the stats server through a [`ServiceLocator`]
/// on every call.
///
/// Each call resolves afresh and uses the first instance returned; there is
/// no stickiness and no client-side balancing.
pub struct StatsClient {
    http: reqwest::Client,
    locator: Arc<dyn ServiceLocator>,
    service_id: String,
    retry: RetryPolicy,
}

impl StatsClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        locator: Arc<dyn ServiceLocator>,
        service_id: impl Into<String>,
        retry: RetryPolicy,
        request_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self::with_http(http, locator, service_id, retry))
    }

    /// Creates a client around an existing HTTP client.
    pub fn with_http(
        http: reqwest::Client,
        locator: Arc<dyn ServiceLocator>,
        service_id: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            http,
            locator,
            service_id: service_id.into(),
            retry,
        }
    }

    /// Builds the client and its locator from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, a static instance
    /// address is malformed, or the HTTP client cannot be built.
    pub fn from_config(config: &StatsClientConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let locator: Arc<dyn ServiceLocator> = match config.discovery {
            DiscoverySource::Static(ref addresses) => Arc::new(
                StaticServiceLocator::from_addresses(&config.service_id, addresses)
                    .context("Invalid STATS_SERVER_INSTANCES")?,
            ),
            DiscoverySource::Catalog(ref url) => {
                Arc::new(ConsulServiceLocator::new(http.clone(), url.clone()))
            }
        };

        Ok(Self::with_http(
            http,
            locator,
            config.service_id.clone(),
            RetryPolicy::new(config.max_attempts, config.backoff),
        ))
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    async fn resolve(&self) -> Result<ServiceInstance, StatsClientError> {
        resolve_first(self.locator.as_ref(), &self.service_id, &self.retry)
            .await
            .map_err(|e| {
                error!(
                    service_id = %self.service_id,
                    attempts = self.retry.max_attempts,
                    "Stats service address resolution failed: {}",
                    e
                );
                StatsClientError::ResolutionFailure {
                    service_id: self.service_id.clone(),
                    attempts: self.retry.max_attempts,
                }
            })
    }

    /// Runs a stats query and reports why it came back empty, if it did.
    ///
    /// Invalid requests are rejected before discovery is consulted.
    pub async fn fetch_stats(&self, request: &StatsRequest) -> StatsOutcome {
        match self.try_fetch_stats(request).await {
            Ok(rows) => StatsOutcome::Data(rows),
            Err(e) => {
                metrics::counter!("stats_client_degraded_total", "reason" => e.reason())
                    .increment(1);
                StatsOutcome::Degraded(e)
            }
        }
    }

    async fn try_fetch_stats(
        &self,
        request: &StatsRequest,
    ) -> Result<Vec<ViewStats>, StatsClientError> {
        let pairs = request.query_pairs().inspect_err(|e| {
            error!(?request, "Get stats was not attempted: {}", e);
        })?;

        let instance = self.resolve().await?;
        let url = format!("{}/stats", instance.base_url());

        let response = self
            .http
            .get(&url)
            .query(&pairs)
            .send()
            .await
            .map_err(|e| call_failure("Get stats", e))?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), url, "Get stats was not successful");
            return Err(StatsClientError::CallFailure {
                status: Some(status.as_u16()),
                message: format!("unexpected status {}", status),
            });
        }

        let rows: Vec<ViewStatsDto> = response
            .json()
            .await
            .map_err(|e| call_failure("Get stats", e))?;

        debug!(rows = rows.len(), "Fetched stats");

        Ok(rows.into_iter().map(ViewStats::from).collect())
    }

    /// Posts one hit and reports the failure instead of swallowing it.
    ///
    /// # Errors
    ///
    /// Returns [`StatsClientError::ResolutionFailure`] or
    /// [`StatsClientError::CallFailure`]; any status of 300 or above is a failure.
    pub async fn send_hit(&self, hit: &NewHit) -> Result<(), StatsClientError> {
        let instance = self.resolve().await?;
        let url = format!("{}/hit", instance.base_url());

        let response = self
            .http
            .post(&url)
            .json(&HitRequest::from(hit.clone()))
            .send()
            .await
            .map_err(|e| call_failure("Hit stats", e))?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), url, "Hit stats was not successful");
            return Err(StatsClientError::CallFailure {
                status: Some(status.as_u16()),
                message: format!("unexpected status {}", status),
            });
        }

        Ok(())
    }
}

fn call_failure(operation: &str, e: reqwest::Error) -> StatsClientError {
    let status = e.status().map(|s| s.as_u16());
    error!(?status, "{} was not successful: {}", operation, e);
    StatsClientError::CallFailure {
        status,
        message: e.to_string(),
    }
}

#[async_trait]
impl StatsApi for StatsClient {
    async fn post_hit(&self, hit: NewHit) {
        if let Err(e) = self.send_hit(&hit).await {
            metrics::counter!("stats_client_degraded_total", "reason" => e.reason()).increment(1);
            debug!(uri = %hit.uri, "Hit dropped: {}", e);
        }
    }

    async fn get_stats(&self, request: StatsRequest) -> Vec<ViewStats> {
        self.fetch_stats(&request).await.into_rows()
    }
}
