//! Joins per-event view counts and confirmed-request counts onto events.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::client::{StatsApi, StatsRequest};
use crate::error::AppError;
use crate::utils::timestamp;

/// Path prefix under which events are served and hits are recorded.
pub const EVENTS_URI_PREFIX: &str = "/events/";

/// Canonical URI of one event, e.g. `/events/42`.
pub fn event_uri(id: i64) -> String {
    format!("{}{}", EVENTS_URI_PREFIX, id)
}

/// Recovers the event id from a canonical event URI.
///
/// Returns `None` for URIs outside the events prefix or with a non-numeric id.
pub fn parse_event_id(uri: &str) -> Option<i64> {
    uri.strip_prefix(EVENTS_URI_PREFIX)?.parse().ok()
}

/// An entity that can carry a view count.
pub trait Viewable {
    fn id(&self) -> i64;
    fn created_on(&self) -> NaiveDateTime;
}

/// Source of confirmed participation requests per event.
///
/// Lives in the main application's request subsystem, not in the stats
/// service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfirmedRequestCounter: Send + Sync {
    /// Confirmed request count per event id. Ids without requests may be absent.
    async fn count_confirmed(&self, event_ids: &[i64]) -> Result<HashMap<i64, i64>, AppError>;
}

/// An entity with its counters attached, serialized flat.
///
/// ```json
/// { "id": 5, "title": "...", "confirmedRequests": 3, "views": 17 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithCounters<E> {
    #[serde(flatten)]
    pub event: E,
    pub confirmed_requests: i64,
    pub views: i64,
}

/// Attaches view counts and confirmed-request counts to batches of events.
pub struct ViewCountJoin {
    stats: Arc<dyn StatsApi>,
    requests: Arc<dyn ConfirmedRequestCounter>,
}

impl ViewCountJoin {
    pub fn new(stats: Arc<dyn StatsApi>, requests: Arc<dyn ConfirmedRequestCounter>) -> Self {
        Self { stats, requests }
    }

    /// Unique-IP view counts per event id, from one stats query for the batch.
    ///
    /// The window starts at the earliest `created_on` and ends at `end`, or
    /// now when `end` is `None`. Events without hits are absent from the map.
    /// An empty batch returns an empty map without querying.
    ///
    /// When several applications report the same event, the largest count
    /// wins. Unique-IP counts from different applications may share visitors,
    /// so they are not added.
    pub async fn view_counts<E: Viewable>(
        &self,
        events: &[E],
        end: Option<NaiveDateTime>,
    ) -> HashMap<i64, i64> {
        let Some(start) = events.iter().map(Viewable::created_on).min() else {
            return HashMap::new();
        };
        let end = end.unwrap_or_else(timestamp::now);

        let uris = events.iter().map(|e| event_uri(e.id())).collect();
        let request = StatsRequest::new(start, end)
            .with_uris(uris)
            .with_unique(true);

        let rows = self.stats.get_stats(request).await;
        debug!(events = events.len(), rows = rows.len(), "Fetched view counts");

        let mut views = HashMap::with_capacity(rows.len());
        for row in rows {
            if let Some(id) = parse_event_id(&row.uri) {
                let seen = views.entry(id).or_insert(0);
                *seen = (*seen).max(row.hits);
            }
        }
        views
    }

    /// Attaches both counters to every event, keeping input order.
    ///
    /// Events without hits or confirmed requests read as zero.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfirmedRequestCounter`] error. Stats failures never
    /// surface here; they read as zero views.
    pub async fn attach<E: Viewable>(
        &self,
        events: Vec<E>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<WithCounters<E>>, AppError> {
        if events.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = events.iter().map(Viewable::id).collect();
        let confirmed = self.requests.count_confirmed(&ids).await?;
        let views = self.view_counts(&events, end).await;

        Ok(events
            .into_iter()
            .map(|event| {
                let id = event.id();
                WithCounters {
                    confirmed_requests: confirmed.get(&id).copied().unwrap_or(0),
                    views: views.get(&id).copied().unwrap_or(0),
                    event,
                }
            })
            .collect())
    }

    /// Attaches counters to a single event, for detail pages.
    ///
    /// # Errors
    ///
    /// See [`ViewCountJoin::attach`].
    pub async fn attach_one<E: Viewable>(
        &self,
        event: E,
        end: Option<NaiveDateTime>,
    ) -> Result<WithCounters<E>, AppError> {
        let id = event.id();
        self.attach(vec![event], end).await?.pop().ok_or_else(|| {
            AppError::internal(
                "Event lost while attaching counters",
                serde_json::json!({ "event_id": id }),
            )
        })
    }
}
