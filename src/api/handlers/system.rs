//! Liveness endpoint.
//!
//! `/health` answers even when the store does not: a failing store turns
//! the status to `degraded` with a 503, so probes notice a herald that keeps
//! running but can no longer reconcile.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::{EventCategory, EventId};

/// Herald liveness report.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the store cannot be read.
    status: &'static str,
    /// Time of this report (RFC 3339).
    timestamp: String,
    /// Crate version.
    version: &'static str,
    /// Defend event currently tracked, if any.
    tracking: Option<EventId>,
    /// Observation time of the newest stored snapshot.
    last_snapshot_at: Option<DateTime<Utc>>,
}

/// `GET /health`: liveness plus a glimpse of the reconciliation state.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Reports the tracked defend event and the newest snapshot time. Answers 503 when the store cannot be read.",
    responses(
        (status = 200, description = "Store readable", body = HealthResponse),
        (status = 503, description = "Store unreadable", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let tracking = state.store.find(EventCategory::Defend).await;
    let latest = state.store.latest_snapshot().await;

    let (code, status) = match (&tracking, &latest) {
        (Ok(_), Ok(_)) => (StatusCode::OK, "healthy"),
        _ => {
            warn!("health check cannot read the store");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
            tracking: tracking.ok().flatten().map(|r| r.event_id),
            last_snapshot_at: latest.ok().flatten().map(|s| s.observed_at),
        }),
    )
}

/// Routes mounted at the root, outside `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
