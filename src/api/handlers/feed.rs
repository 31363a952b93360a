//! Feed handlers: current feed, manual refresh, event detail.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{FeedItemDto, FeedResponse, RefreshResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, FeedError};

/// `GET /feed`: Current ranked feed.
#[utoipa::path(
    get,
    path = "/api/v1/feed",
    tag = "Feed",
    summary = "Get the current feed",
    description = "Returns the latest derived list with per-event distance, the lifecycle phase, the active-filters flag and the last fetch error, if any.",
    responses(
        (status = 200, description = "Current feed snapshot", body = FeedResponse),
    )
)]
pub async fn get_feed(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.feed_service.feed();
    Json(FeedResponse::from(&snapshot))
}

/// `POST /feed/refresh`: Fetch now, bypassing the location debounce.
///
/// # Errors
///
/// Returns [`FeedError::EngineStopped`] if the engine is no longer running.
#[utoipa::path(
    post,
    path = "/api/v1/feed/refresh",
    tag = "Feed",
    summary = "Refresh the feed",
    description = "Asks the engine for an immediate fetch at the current position. Ignored when no usable position is known. The result shows up in the feed and on the WebSocket.",
    responses(
        (status = 202, description = "Refresh accepted", body = RefreshResponse),
        (status = 503, description = "Feed engine stopped", body = ErrorResponse),
    )
)]
pub async fn refresh_feed(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, FeedError> {
    state.feed_service.refresh().await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(RefreshResponse {
            status: "accepted".to_string(),
        }),
    ))
}

/// `GET /events/{id}`: Detail of a fetched event.
///
/// # Errors
///
/// Returns [`FeedError::EventNotFound`] if the last fetch did not return it.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Feed",
    summary = "Get event details",
    description = "Looks the event up in the last fetched list, including events hidden by the current filters.",
    params(
        ("id" = String, Path, description = "Event identifier"),
    ),
    responses(
        (status = 200, description = "Event details", body = FeedItemDto),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, FeedError> {
    let ranked = state.feed_service.event_detail(&id)?;
    Ok(Json(FeedItemDto::from(&ranked)))
}

/// Feed routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/feed", get(get_feed))
        .route("/feed/refresh", post(refresh_feed))
        .route("/events/{id}", get(get_event))
}
