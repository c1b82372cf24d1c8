mod common;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::Request;
use axum::extract::connect_info::MockConnectInfo;
use axum::middleware;
use axum::routing::get;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

use common::{CountingLocator, t0};
use ewm_stats::client::hit_forwarder::spawn_hit_forwarder;
use ewm_stats::client::middleware::record_hits;
use ewm_stats::client::{StatsApi, StatsRequest};
use ewm_stats::domain::entities::NewHit;
use ewm_stats::error::AppError;
use ewm_stats::views::{ConfirmedRequestCounter, ViewCountJoin, Viewable, event_uri};

#[derive(Debug, Clone, Serialize)]
struct Event {
    id: i64,
    #[serde(skip)]
    created_on: NaiveDateTime,
}

impl Viewable for Event {
    fn id(&self) -> i64 {
        self.id
    }

    fn created_on(&self) -> NaiveDateTime {
        self.created_on
    }
}

fn event(id: i64) -> Event {
    Event {
        id,
        created_on: t0(),
    }
}

struct FixedRequests(HashMap<i64, i64>);

#[async_trait]
impl ConfirmedRequestCounter for FixedRequests {
    async fn count_confirmed(&self, _event_ids: &[i64]) -> Result<HashMap<i64, i64>, AppError> {
        Ok(self.0.clone())
    }
}

#[tokio::test]
async fn test_views_joined_from_live_stats_server() {
    let (state, _repo) = common::create_memory_state();
    let addr = common::spawn_stats_server(state).await;
    let locator = Arc::new(CountingLocator::new(vec![common::instance(addr)]));
    let client: Arc<dyn StatsApi> = Arc::new(common::fast_client(locator.clone()));

    let visits = [
        (1, "1.1.1.1"),
        (1, "1.1.1.1"),
        (1, "2.2.2.2"),
        (2, "1.1.1.1"),
        (4, "1.1.1.1"),
    ];
    for (id, ip) in visits {
        client
            .post_hit(NewHit::new(
                "main-server",
                event_uri(id),
                ip,
                t0() + Duration::minutes(1),
            ))
            .await;
    }
    let calls_before = locator.calls();

    let join = ViewCountJoin::new(client, Arc::new(FixedRequests(HashMap::from([(2, 5)]))));
    let events = vec![event(1), event(2), event(3)];

    let attached = join
        .attach(events, Some(t0() + Duration::hours(1)))
        .await
        .unwrap();

    let counters: Vec<(i64, i64, i64)> = attached
        .iter()
        .map(|w| (w.event.id, w.views, w.confirmed_requests))
        .collect();
    assert_eq!(counters, vec![(1, 2, 0), (2, 1, 5), (3, 0, 0)]);

    // One stats query for the whole batch.
    assert_eq!(locator.calls(), calls_before + 1);
}

#[tokio::test]
async fn test_views_read_zero_when_stats_are_down() {
    let addr = common::closed_port().await;
    let locator = Arc::new(CountingLocator::new(vec![common::instance(addr)]));
    let client: Arc<dyn StatsApi> = Arc::new(common::fast_client(locator));

    let join = ViewCountJoin::new(client, Arc::new(FixedRequests(HashMap::new())));

    let detail = join.attach_one(event(7), None).await.unwrap();

    assert_eq!(detail.views, 0);
}

#[tokio::test]
async fn test_empty_batch_makes_no_call() {
    let locator = Arc::new(CountingLocator::empty());
    let client: Arc<dyn StatsApi> = Arc::new(common::fast_client(locator.clone()));
    let join = ViewCountJoin::new(client, Arc::new(FixedRequests(HashMap::new())));

    let attached = join.attach(Vec::<Event>::new(), None).await.unwrap();

    assert!(attached.is_empty());
    assert_eq!(locator.calls(), 0);
}

#[tokio::test]
async fn test_middleware_hits_reach_stats_server() {
    let (state, repo) = common::create_memory_state();
    let addr = common::spawn_stats_server(state).await;
    let locator = Arc::new(CountingLocator::new(vec![common::instance(addr)]));
    let client: Arc<dyn StatsApi> = Arc::new(common::fast_client(locator));

    let recorder = spawn_hit_forwarder("main-server", client.clone(), 16, 2, false);
    let peer: SocketAddr = "10.1.2.3:40000".parse().unwrap();

    let app = Router::new()
        .route("/events/{id}", get(|| async { "event" }))
        .layer(middleware::from_fn_with_state(recorder, record_hits))
        .layer(MockConnectInfo(peer));

    for id in [1, 1, 2] {
        let request = Request::builder()
            .uri(event_uri(id))
            .body(Body::empty())
            .unwrap();
        app.clone().oneshot(request).await.unwrap();
    }

    // Forwarding is asynchronous; wait for the store to catch up.
    for _ in 0..100 {
        if repo.len().await == 3 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(repo.len().await, 3);

    let rows = client
        .get_stats(
            StatsRequest::new(t0() - Duration::days(36_500), t0() + Duration::days(36_500))
                .with_uris(vec![event_uri(1)]),
        )
        .await;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].application, "main-server");
    assert_eq!(rows[0].hits, 2);
}
