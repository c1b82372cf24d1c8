//! Handler for hit recording.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::hit::{HitRequest, HitResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Records one hit.
///
/// # Endpoint
///
/// `POST /hit`
///
/// # Response
///
/// 201 Created with the stored record, including its assigned `id`.
///
/// # Errors
///
/// Returns 500 with code `write_failure` if the store rejects the write.
pub async fn hit_handler(
    State(state): State<AppState>,
    Json(payload): Json<HitRequest>,
) -> Result<(StatusCode, Json<HitResponse>), AppError> {
    let hit = state.stats_service.record_hit(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(hit.into())))
}
