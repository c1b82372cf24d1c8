//! Process-local hit store.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::StatsQuery;
use crate::domain::entities::{Hit, NewHit, ViewStats};
use crate::domain::repositories::HitRepository;
use crate::error::AppError;

/// A hit store that keeps every record in memory.
///
/// Aggregates with the same semantics as the SQL store. Used for local
/// runs without PostgreSQL (`STORAGE=memory`) and in tests.
#[derive(Default)]
pub struct InMemoryHitRepository {
    hits: RwLock<Vec<Hit>>,
}

impl InMemoryHitRepository {
    pub fn new() -> Self {
        debug!("Using in-memory hit store");
        Self::default()
    }

    /// Number of stored hits.
    pub async fn len(&self) -> usize {
        self.hits.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.hits.read().await.is_empty()
    }
}

#[derive(Default)]
struct Group<'a> {
    total: i64,
    ips: HashSet<&'a str>,
}

#[async_trait]
impl HitRepository for InMemoryHitRepository {
    async fn record_hit(&self, new_hit: NewHit) -> Result<Hit, AppError> {
        let mut hits = self.hits.write().await;
        let id = hits.last().map_or(1, |last| last.id + 1);
        let hit = new_hit.into_hit(id);
        hits.push(hit.clone());
        Ok(hit)
    }

    async fn aggregate(&self, query: &StatsQuery) -> Result<Vec<ViewStats>, AppError> {
        let hits = self.hits.read().await;
        let uri_filter: HashSet<&str> = query.uris.iter().map(String::as_str).collect();

        // Groups keep first-seen order so ties stay in scan order after the stable sort.
        let mut order: Vec<(&str, &str)> = Vec::new();
        let mut groups: HashMap<(&str, &str), Group<'_>> = HashMap::new();

        for hit in hits.iter() {
            if !query.covers(hit.moment) {
                continue;
            }
            if !uri_filter.is_empty() && !uri_filter.contains(hit.uri.as_str()) {
                continue;
            }

            let key = (hit.application.as_str(), hit.uri.as_str());
            let group = groups.entry(key).or_insert_with(|| {
                order.push(key);
                Group::default()
            });
            group.total += 1;
            group.ips.insert(hit.ip.as_str());
        }

        let mut stats: Vec<ViewStats> = order
            .into_iter()
            .map(|key| {
                let group = &groups[&key];
                let count = if query.unique {
                    group.ips.len() as i64
                } else {
                    group.total
                };
                ViewStats::new(key.0, key.1, count)
            })
            .collect();

        stats.sort_by(|a, b| b.hits.cmp(&a.hits));

        Ok(stats)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
