//! System endpoints: health check and category catalog.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::CategoryInfo;
use crate::app_state::AppState;
use crate::domain::Category;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    engine_running: bool,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health, version, current timestamp and whether the feed engine is running. Reports 503 once the engine has stopped.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Feed engine stopped", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let engine_running = state.feed_service.handle().is_running();
    let (status, label) = if engine_running {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            engine_running,
        }),
    )
}

/// `GET /config/categories`: List the fixed category set.
#[utoipa::path(
    get,
    path = "/config/categories",
    tag = "System",
    summary = "List event categories",
    description = "Returns every category a filter can select, with its display name.",
    responses(
        (status = 200, description = "Category catalog", body = Vec<CategoryInfo>),
    )
)]
pub async fn categories_handler() -> impl IntoResponse {
    let categories: Vec<CategoryInfo> = Category::ALL
        .iter()
        .map(|category| CategoryInfo {
            category: *category,
            label: category.label().to_string(),
        })
        .collect();
    (StatusCode::OK, Json(categories))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/categories", get(categories_handler))
}
