//! Hit recording and aggregation service.

use std::sync::Arc;

use crate::domain::entities::{Hit, NewHit, ViewStats};
use crate::domain::repositories::HitRepository;
use crate::domain::stats_query::StatsQuery;
use crate::error::AppError;

/// Service behind the stats HTTP API.
///
/// Storage failures and invalid windows are reported to the caller; nothing
/// is swallowed on this side of the wire.
pub struct StatsService<R: HitRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: HitRepository + ?Sized> StatsService<R> {
    /// Creates a new statistics service.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Records one hit and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::WriteFailure`] when the store rejects the write.
    pub async fn record_hit(&self, new_hit: NewHit) -> Result<Hit, AppError> {
        tracing::debug!(
            app = %new_hit.application,
            uri = %new_hit.uri,
            ip = %new_hit.ip,
            "Recording hit"
        );

        let hit = self.repository.record_hit(new_hit).await?;
        metrics::counter!("stats_hits_recorded_total").increment(1);

        Ok(hit)
    }

    /// Aggregates hits for the query window.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRange`] if `start` is after `end`.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn get_stats(&self, query: StatsQuery) -> Result<Vec<ViewStats>, AppError> {
        if query.start > query.end {
            return Err(AppError::invalid_range(query.start, query.end));
        }

        self.repository.aggregate(&query).await
    }

    /// Reports whether the backing store is reachable.
    pub async fn storage_healthy(&self) -> bool {
        self.repository.health_check().await
    }
}
