//! Handler for aggregated hit statistics.

use axum::{Json, extract::State};
use axum_extra::extract::Query;

use crate::api::dto::stats::{StatsQueryParams, ViewStatsDto};
use crate::error::AppError;
use crate::state::AppState;

/// Returns hit counts per `(app, uri)` for a time window.
///
/// # Endpoint
///
/// `GET /stats`
///
/// # Query Parameters
///
/// - `start` (required): window start, `yyyy-MM-dd HH:mm:ss`
/// - `end` (required): window end, `yyyy-MM-dd HH:mm:ss`
/// - `uris` (optional, repeated or comma-separated): restrict to these URIs
/// - `unique` (optional, default `false`): count distinct IPs only
///
/// # Response
///
/// JSON array of `{app, uri, hits}` ordered by `hits` descending.
///
/// # Errors
///
/// Returns 400 `validation_error` for missing or malformed timestamps.
/// Returns 400 `invalid_range` if `start` is after `end`.
pub async fn stats_handler(
    State(state): State<AppState>,
    Query(params): Query<StatsQueryParams>,
) -> Result<Json<Vec<ViewStatsDto>>, AppError> {
    let query = params.into_query()?;

    let stats = state.stats_service.get_stats(query).await?;

    Ok(Json(stats.into_iter().map(ViewStatsDto::from).collect()))
}
