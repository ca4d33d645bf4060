//! Ongoing-event handlers: list and lookup.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{OngoingEventDto, OngoingEventListResponse};
use crate::app_state::AppState;
use crate::domain::{EventCategory, EventId, OngoingEvent};
use crate::error::{ErrorResponse, HeraldError};

/// Attaches the last stored detail to `record`.
async fn with_detail(
    state: &AppState,
    record: OngoingEvent,
) -> Result<OngoingEventDto, HeraldError> {
    let detail = state
        .store
        .lookup_event_detail(record.event_id, record.category)
        .await?;
    Ok(OngoingEventDto::new(record, detail))
}

/// `GET /events/ongoing`: List live registry records.
///
/// # Errors
///
/// Returns [`HeraldError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/events/ongoing",
    tag = "Events",
    summary = "List ongoing events",
    description = "Returns every event the herald currently tracks, with its last stored detail.",
    responses(
        (status = 200, description = "Ongoing events", body = OngoingEventListResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn list_ongoing(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, HeraldError> {
    let records = state.store.list().await?;
    let mut data = Vec::with_capacity(records.len());
    for record in records {
        data.push(with_detail(&state, record).await?);
    }
    Ok(Json(OngoingEventListResponse { data }))
}

/// `GET /events/ongoing/{category}/{event_id}`: Get one live record.
///
/// # Errors
///
/// Returns [`HeraldError::InvalidRequest`] for an unknown category and
/// [`HeraldError::NotFound`] if the event is not tracked.
#[utoipa::path(
    get,
    path = "/api/v1/events/ongoing/{category}/{event_id}",
    tag = "Events",
    summary = "Get an ongoing event",
    description = "Returns the registry record of one tracked event.",
    params(
        ("category" = String, Path, description = "Event category (`defend`)"),
        ("event_id" = i32, Path, description = "Upstream event id"),
    ),
    responses(
        (status = 200, description = "Tracked event", body = OngoingEventDto),
        (status = 400, description = "Unknown category", body = ErrorResponse),
        (status = 404, description = "Event not tracked", body = ErrorResponse),
    )
)]
pub async fn get_ongoing(
    State(state): State<AppState>,
    Path((category, event_id)): Path<(String, i32)>,
) -> Result<impl IntoResponse, HeraldError> {
    let category: EventCategory = category.parse().map_err(HeraldError::InvalidRequest)?;
    let event_id = EventId::new(event_id);

    let record = state
        .store
        .find_by_id(event_id, category)
        .await?
        .ok_or_else(|| HeraldError::NotFound(format!("{category} event {event_id} not tracked")))?;

    Ok(Json(with_detail(&state, record).await?))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events/ongoing", get(list_ongoing))
        .route("/events/ongoing/{category}/{event_id}", get(get_ongoing))
}
