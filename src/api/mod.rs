//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; `/health` and
//! `/config/categories` live at the root. With the `swagger-ui` feature the
//! OpenAPI document is served at `/api-docs/openapi.json` and browsable at
//! `/swagger-ui`.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "discovery-feed",
        description = "Location-aware feed of nearby events: filters, ranking and live updates."
    ),
    paths(
        handlers::system::health_handler,
        handlers::system::categories_handler,
        handlers::feed::get_feed,
        handlers::feed::refresh_feed,
        handlers::feed::get_event,
        handlers::filters::get_filters,
        handlers::filters::set_search,
        handlers::filters::toggle_category,
        handlers::filters::set_date_range,
        handlers::filters::clear_date_range,
        handlers::filters::set_radius,
        handlers::filters::clear_filters,
        handlers::location::report_position,
        handlers::location::set_authorization,
    ),
    tags(
        (name = "System", description = "Health and static configuration"),
        (name = "Feed", description = "Ranked feed and event details"),
        (name = "Filters", description = "Search, category, date and radius filters"),
        (name = "Location", description = "Device position and permission"),
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
