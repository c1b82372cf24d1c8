//! Background forwarding of hits to the stats service.
//!
//! Request handlers enqueue hits on a bounded channel through a
//! [`HitRecorder`] and never wait on the stats service. A single worker
//! drains the channel and posts each hit on its own task, with at most
//! `concurrency` posts in flight. When the queue is full the hit is dropped.

use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info, warn};

use crate::client::stats_client::StatsApi;
use crate::domain::entities::NewHit;
use crate::utils::timestamp;

/// Cheap, cloneable handle used by request handlers to record hits.
#[derive(Clone)]
pub struct HitRecorder {
    app_name: Arc<str>,
    sender: mpsc::Sender<NewHit>,
    behind_proxy: bool,
}

impl HitRecorder {
    pub fn new(
        app_name: impl Into<String>,
        sender: mpsc::Sender<NewHit>,
        behind_proxy: bool,
    ) -> Self {
        Self {
            app_name: Arc::from(app_name.into()),
            sender,
            behind_proxy,
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Whether the client IP should be taken from proxy headers.
    pub fn behind_proxy(&self) -> bool {
        self.behind_proxy
    }

    /// Enqueues a hit stamped with the current local time.
    ///
    /// Returns `false` if the hit was dropped because the queue is full or
    /// the forwarder has stopped.
    pub fn record(&self, uri: impl Into<String>, ip: impl Into<String>) -> bool {
        let hit = NewHit::new(self.app_name.as_ref(), uri, ip, timestamp::now());

        match self.sender.try_send(hit) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(hit)) => {
                warn!(uri = %hit.uri, "Hit queue is full, dropping hit");
                metrics::counter!("stats_client_hits_dropped_total").increment(1);
                false
            }
            Err(mpsc::error::TrySendError::Closed(hit)) => {
                warn!(uri = %hit.uri, "Hit forwarder stopped, dropping hit");
                metrics::counter!("stats_client_hits_dropped_total").increment(1);
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Drains `rx` and posts every hit through `stats`.
///
/// Returns once every sender is dropped and all in-flight posts finished.
pub async fn run_hit_forwarder(
    mut rx: mpsc::Receiver<NewHit>,
    stats: Arc<dyn StatsApi>,
    concurrency: usize,
) {
    let concurrency = concurrency.max(1);
    let permits = Arc::new(Semaphore::new(concurrency));

    info!(concurrency, "Hit forwarder started");

    while let Some(hit) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let stats = stats.clone();

        tokio::spawn(async move {
            stats.post_hit(hit).await;
            drop(permit);
        });
    }

    // Wait for in-flight posts.
    if let Ok(all) = permits.acquire_many(concurrency as u32).await {
        drop(all);
    }

    debug!("Hit forwarder stopped");
}

/// Spawns the forwarder task and returns the handle that feeds it.
pub fn spawn_hit_forwarder(
    app_name: impl Into<String>,
    stats: Arc<dyn StatsApi>,
    queue_capacity: usize,
    concurrency: usize,
    behind_proxy: bool,
) -> HitRecorder {
    let (tx, rx) = mpsc::channel(queue_capacity.max(1));
    tokio::spawn(run_hit_forwarder(rx, stats, concurrency));
    HitRecorder::new(app_name, tx, behind_proxy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::stats_client::MockStatsApi;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_forwards_every_hit_then_stops() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut stats = MockStatsApi::new();
        stats.expect_post_hit().times(3).returning(move |hit| {
            sink.lock().unwrap().push(hit.uri);
        });

        let (tx, rx) = mpsc::channel(8);
        let recorder = HitRecorder::new("main-server", tx, false);

        assert!(recorder.record("/events/1", "1.1.1.1"));
        assert!(recorder.record("/events/2", "1.1.1.1"));
        assert!(recorder.record("/events", "2.2.2.2"));
        drop(recorder);

        run_hit_forwarder(rx, Arc::new(stats), 2).await;

        let mut uris = seen.lock().unwrap().clone();
        uris.sort();
        assert_eq!(uris, vec!["/events", "/events/1", "/events/2"]);
    }

    #[tokio::test]
    async fn test_recorded_hit_carries_app_name() {
        let (tx, mut rx) = mpsc::channel(1);
        let recorder = HitRecorder::new("main-server", tx, false);

        recorder.record("/events/7", "10.0.0.1");

        let hit = rx.recv().await.unwrap();
        assert_eq!(hit.application, "main-server");
        assert_eq!(hit.uri, "/events/7");
        assert_eq!(hit.ip, "10.0.0.1");
    }

    #[tokio::test]
    async fn test_full_queue_drops_hit() {
        let (tx, _rx) = mpsc::channel(1);
        let recorder = HitRecorder::new("main-server", tx, false);

        assert!(recorder.record("/events/1", "1.1.1.1"));
        assert!(!recorder.record("/events/2", "1.1.1.1"));
    }

    #[tokio::test]
    async fn test_closed_queue_drops_hit() {
        let (tx, rx) = mpsc::channel(1);
        let recorder = HitRecorder::new("main-server", tx, false);
        drop(rx);

        assert!(recorder.is_closed());
        assert!(!recorder.record("/events/1", "1.1.1.1"));
    }
}
