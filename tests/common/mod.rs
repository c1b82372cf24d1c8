#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::Request;
use axum::routing::get;
use axum::{Router, ServiceExt};
use chrono::{NaiveDate, NaiveDateTime};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ewm_stats::api::handlers::health_handler;
use ewm_stats::api::routes::stats_routes;
use ewm_stats::client::{DiscoveryError, RetryPolicy, ServiceInstance, ServiceLocator, StatsClient};
use ewm_stats::infrastructure::persistence::InMemoryHitRepository;
use ewm_stats::routes::app_router;
use ewm_stats::state::AppState;

pub const SERVICE_ID: &str = "stats-server";

/// Noon on 2025-06-01, the reference moment for test hits.
pub fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub fn create_memory_state() -> (AppState, Arc<InMemoryHitRepository>) {
    let repo = Arc::new(InMemoryHitRepository::new());
    (AppState::new(repo.clone()), repo)
}

/// Stats API routes without the outer layers, for `axum_test::TestServer`.
pub fn stats_app(state: AppState) -> Router {
    Router::new()
        .merge(stats_routes())
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Serves the full stats router on a loopback port.
pub async fn spawn_stats_server(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app_router(state);

    tokio::spawn(async move {
        axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
            .await
            .unwrap();
    });

    addr
}

/// Serves an arbitrary router on a loopback port.
pub async fn spawn_router(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn instance(addr: SocketAddr) -> ServiceInstance {
    ServiceInstance::new(addr.ip().to_string(), addr.port())
}

/// Locator returning a fixed list and counting lookups.
#[derive(Default)]
pub struct CountingLocator {
    instances: Vec<ServiceInstance>,
    calls: AtomicUsize,
}

impl CountingLocator {
    pub fn new(instances: Vec<ServiceInstance>) -> Self {
        Self {
            instances,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServiceLocator for CountingLocator {
    async fn instances(&self, _service_id: &str) -> Result<Vec<ServiceInstance>, DiscoveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.instances.clone())
    }
}

/// Client with a short backoff so failing tests stay fast.
pub fn fast_client(locator: Arc<CountingLocator>) -> StatsClient {
    StatsClient::new(
        locator,
        SERVICE_ID,
        RetryPolicy::new(3, Duration::from_millis(10)),
        Duration::from_secs(5),
    )
    .unwrap()
}

/// Client with the production retry policy.
pub fn default_client(locator: Arc<CountingLocator>) -> StatsClient {
    StatsClient::new(
        locator,
        SERVICE_ID,
        RetryPolicy::default(),
        Duration::from_secs(5),
    )
    .unwrap()
}
