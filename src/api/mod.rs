//! Status API: read-only view of the herald's durable state.
//!
//! Resource endpoints are mounted under `/api/v1`; `/health` sits at the
//! root. With the `swagger-ui` feature the OpenAPI document is served at
//! `/swagger-ui`.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document of the status API.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "defend-herald status API"),
    paths(
        handlers::system::health_handler,
        handlers::events::list_ongoing,
        handlers::events::get_ongoing,
        handlers::snapshots::latest_snapshot,
    ),
    components(schemas(
        handlers::system::HealthResponse,
        dto::OngoingEventDto,
        dto::OngoingEventListResponse,
        crate::domain::Snapshot,
        crate::error::ErrorResponse,
    )),
    tags(
        (name = "System", description = "Liveness"),
        (name = "Events", description = "Ongoing-event registry"),
        (name = "Snapshots", description = "Stored campaign snapshots"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
