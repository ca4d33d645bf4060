//! Snapshot handlers.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::domain::Snapshot;
use crate::error::{ErrorResponse, HeraldError};

/// `GET /snapshots/latest`: Most recent stored snapshot.
///
/// # Errors
///
/// Returns [`HeraldError::NotFound`] when nothing has been stored yet.
#[utoipa::path(
    get,
    path = "/api/v1/snapshots/latest",
    tag = "Snapshots",
    summary = "Latest snapshot",
    description = "Returns the most recent campaign snapshot stored by the poll loop.",
    responses(
        (status = 200, description = "Latest snapshot", body = Snapshot),
        (status = 404, description = "No snapshot stored yet", body = ErrorResponse),
    )
)]
pub async fn latest_snapshot(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, HeraldError> {
    let snapshot = state
        .store
        .latest_snapshot()
        .await?
        .ok_or_else(|| HeraldError::NotFound("no snapshot stored yet".to_string()))?;
    Ok(Json(snapshot))
}

/// Snapshot routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/snapshots/latest", get(latest_snapshot))
}
