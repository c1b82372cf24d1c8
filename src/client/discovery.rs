//! Service discovery for the stats client.
//!
//! The client never holds a static stats server address. Every call asks a
//! [`ServiceLocator`] for the instances registered under a logical service id
//! and uses the first one returned. Lookups that fail, or return nothing, are
//! retried on a fixed interval up to [`RetryPolicy::max_attempts`] times.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::iter::Take;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, warn};

/// Resolution attempts per call, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Pause between two resolution attempts.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(3);

/// Errors raised while looking up service instances.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError {
    #[error("no instances registered for service '{0}'")]
    NoInstances(String),

    #[error("invalid instance address '{0}', expected host:port")]
    InvalidAddress(String),

    #[error("registry request failed: {0}")]
    Registry(String),
}

/// A network location of one service instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInstance {
    pub host: String,
    pub port: u16,
}

impl ServiceInstance {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parses a `host:port` pair.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidAddress`] when the port is missing or
    /// not a number, or the host is empty.
    pub fn parse(address: &str) -> Result<Self, DiscoveryError> {
        let invalid = || DiscoveryError::InvalidAddress(address.to_string());

        let (host, port) = address.trim().rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        let port = port.parse().map_err(|_| invalid())?;

        Ok(Self::new(host, port))
    }

    /// Base URL for plain HTTP calls to this instance.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Lists the instances registered under a logical service id.
///
/// Implementations must not cache a chosen instance between calls; the
/// client picks the first element of every fresh result.
///
/// # Implementations
///
/// - [`StaticServiceLocator`] - fixed, configured instance lists
/// - [`ConsulServiceLocator`] - Consul-compatible catalog over HTTP
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceLocator: Send + Sync {
    async fn instances(&self, service_id: &str) -> Result<Vec<ServiceInstance>, DiscoveryError>;
}

/// Locator backed by a fixed map of service ids to instances.
#[derive(Debug, Clone, Default)]
pub struct StaticServiceLocator {
    services: HashMap<String, Vec<ServiceInstance>>,
}

impl StaticServiceLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `instances` under `service_id`, replacing any previous list.
    pub fn with_service(
        mut self,
        service_id: impl Into<String>,
        instances: Vec<ServiceInstance>,
    ) -> Self {
        self.services.insert(service_id.into(), instances);
        self
    }

    /// Builds a locator for one service from `host:port` strings.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidAddress`] for the first malformed address.
    pub fn from_addresses(
        service_id: impl Into<String>,
        addresses: &[String],
    ) -> Result<Self, DiscoveryError> {
        let instances = addresses
            .iter()
            .map(|a| ServiceInstance::parse(a))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new().with_service(service_id, instances))
    }
}

#[async_trait]
impl ServiceLocator for StaticServiceLocator {
    async fn instances(&self, service_id: &str) -> Result<Vec<ServiceInstance>, DiscoveryError> {
        Ok(self.services.get(service_id).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CatalogEntry {
    address: String,
    #[serde(default)]
    service_address: String,
    service_port: u16,
}

/// Locator querying a Consul-compatible catalog:
/// `GET {base_url}/v1/catalog/service/{service_id}`.
pub struct ConsulServiceLocator {
    http: reqwest::Client,
    base_url: String,
}

impl ConsulServiceLocator {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ServiceLocator for ConsulServiceLocator {
    async fn instances(&self, service_id: &str) -> Result<Vec<ServiceInstance>, DiscoveryError> {
        let url = format!("{}/v1/catalog/service/{}", self.base_url, service_id);

        let entries: Vec<CatalogEntry> = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DiscoveryError::Registry(e.to_string()))?
            .json()
            .await
            .map_err(|e| DiscoveryError::Registry(e.to_string()))?;

        Ok(entries
            .into_iter()
            .map(|entry| {
                // ServiceAddress is empty when the service registered without one.
                let host = if entry.service_address.is_empty() {
                    entry.address
                } else {
                    entry.service_address
                };
                ServiceInstance::new(host, entry.service_port)
            })
            .collect())
    }
}

/// Bounded fixed-interval retry for address resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Delays between attempts; one fewer than the attempt count.
    fn delays(&self) -> Take<FixedInterval> {
        FixedInterval::new(self.backoff).take(self.max_attempts.saturating_sub(1))
    }
}

/// Resolves `service_id` to the first instance the locator returns.
///
/// An empty instance list counts as a failed attempt.
///
/// # Errors
///
/// Returns the last [`DiscoveryError`] once every attempt has failed.
pub async fn resolve_first(
    locator: &dyn ServiceLocator,
    service_id: &str,
    policy: &RetryPolicy,
) -> Result<ServiceInstance, DiscoveryError> {
    let mut attempt = 0usize;
    let max_attempts = policy.max_attempts;

    Retry::start(policy.delays(), || {
        attempt += 1;
        let current = attempt;
        async move {
            let result = locator.instances(service_id).await.and_then(|instances| {
                instances
                    .into_iter()
                    .next()
                    .ok_or_else(|| DiscoveryError::NoInstances(service_id.to_string()))
            });

            match result {
                Ok(instance) => {
                    debug!(
                        service_id,
                        host = %instance.host,
                        port = instance.port,
                        "Resolved service instance"
                    );
                    Ok(instance)
                }
                Err(e) => {
                    warn!(
                        service_id,
                        attempt = current,
                        max_attempts,
                        "Service resolution attempt failed: {}",
                        e
                    );
                    Err(e)
                }
            }
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instance() {
        let instance = ServiceInstance::parse("stats-server:9090").unwrap();
        assert_eq!(instance, ServiceInstance::new("stats-server", 9090));
        assert_eq!(instance.base_url(), "http://stats-server:9090");
    }

    #[test]
    fn test_parse_instance_rejects_malformed() {
        assert!(ServiceInstance::parse("stats-server").is_err());
        assert!(ServiceInstance::parse(":9090").is_err());
        assert!(ServiceInstance::parse("stats-server:http").is_err());
        assert!(ServiceInstance::parse("stats-server:70000").is_err());
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff, Duration::from_secs(3));

        let delays: Vec<Duration> = policy.delays().collect();
        assert_eq!(delays, vec![Duration::from_secs(3), Duration::from_secs(3)]);
    }

    #[tokio::test]
    async fn test_static_locator() {
        let locator = StaticServiceLocator::from_addresses(
            "stats-server",
            &["a:1".to_string(), "b:2".to_string()],
        )
        .unwrap();

        let instances = locator.instances("stats-server").await.unwrap();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].host, "a");

        assert!(locator.instances("unknown").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_first_picks_first_instance() {
        let mut locator = MockServiceLocator::new();
        locator.expect_instances().times(1).returning(|_| {
            Ok(vec![
                ServiceInstance::new("first", 1),
                ServiceInstance::new("second", 2),
            ])
        });

        let instance = resolve_first(&locator, "stats-server", &RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(instance.host, "first");
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_first_recovers_on_later_attempt() {
        let mut locator = MockServiceLocator::new();
        let mut seq = mockall::Sequence::new();
        locator
            .expect_instances()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id| Err(DiscoveryError::Registry(format!("{} unreachable", id))));
        locator
            .expect_instances()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![ServiceInstance::new("late", 9090)]));

        let started = tokio::time::Instant::now();
        let instance = resolve_first(&locator, "stats-server", &RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(instance.host, "late");
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_millis(3_100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_first_gives_up_after_max_attempts() {
        let mut locator = MockServiceLocator::new();
        locator
            .expect_instances()
            .times(3)
            .returning(|_| Ok(vec![]));

        let started = tokio::time::Instant::now();
        let result = resolve_first(&locator, "stats-server", &RetryPolicy::default()).await;

        assert_eq!(
            result,
            Err(DiscoveryError::NoInstances("stats-server".to_string()))
        );
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(6));
        assert!(elapsed < Duration::from_millis(6_100));
    }
}
