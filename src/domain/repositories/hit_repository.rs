//! Repository trait for the hit store and its aggregation.

use crate::domain::entities::{Hit, NewHit, ViewStats};
use crate::domain::stats_query::StatsQuery;
use crate::error::AppError;
use async_trait::async_trait;

/// Append-only hit log with windowed aggregation.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgHitRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryHitRepository`] - process-local store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HitRepository: Send + Sync {
    /// Appends one hit. Never deduplicates: every call stores one row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::WriteFailure`] when the storage layer fails.
    async fn record_hit(&self, new_hit: NewHit) -> Result<Hit, AppError>;

    /// Counts hits per `(application, uri)` inside the query window.
    ///
    /// Counts distinct IPs when `query.unique` is set. Rows are ordered by
    /// `hits` descending; an empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn aggregate(&self, query: &StatsQuery) -> Result<Vec<ViewStats>, AppError>;

    /// Checks that the backing store is reachable.
    async fn health_check(&self) -> bool;
}
