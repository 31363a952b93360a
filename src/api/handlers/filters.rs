//! Filter editing handlers.
//!
//! Every handler returns the filter values as edited. The feed itself
//! reflects them once the search debounce window has passed.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{DateRangeRequest, RadiusRequest, SearchTextRequest, ToggleCategoryResponse};
use crate::app_state::AppState;
use crate::domain::FilterState;
use crate::error::{ErrorResponse, FeedError};

/// `GET /filters`: Current filter values.
#[utoipa::path(
    get,
    path = "/api/v1/filters",
    tag = "Filters",
    summary = "Get filters",
    responses(
        (status = 200, description = "Current filters", body = FilterState),
    )
)]
pub async fn get_filters(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.feed_service.filters())
}

/// `PUT /filters/search`: Replace the search text.
#[utoipa::path(
    put,
    path = "/api/v1/filters/search",
    tag = "Filters",
    summary = "Set search text",
    description = "Case-insensitive substring match on title or description. An empty string removes the text restriction.",
    request_body = SearchTextRequest,
    responses(
        (status = 200, description = "Updated filters", body = FilterState),
    )
)]
pub async fn set_search(
    State(state): State<AppState>,
    Json(req): Json<SearchTextRequest>,
) -> impl IntoResponse {
    Json(state.feed_service.set_search_text(req.text))
}

/// `POST /filters/categories/{category}/toggle`: Flip one category.
///
/// # Errors
///
/// Returns [`FeedError::UnknownCategory`] for names outside the fixed set.
#[utoipa::path(
    post,
    path = "/api/v1/filters/categories/{category}/toggle",
    tag = "Filters",
    summary = "Toggle a category",
    params(
        ("category" = String, Path, description = "Category wire name, e.g. `music`"),
    ),
    responses(
        (status = 200, description = "Category toggled", body = ToggleCategoryResponse),
        (status = 400, description = "Unknown category", body = ErrorResponse),
    )
)]
pub async fn toggle_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, FeedError> {
    let (category, selected) = state.feed_service.toggle_category(&category)?;
    Ok(Json(ToggleCategoryResponse {
        category,
        selected,
        filters: state.feed_service.filters(),
    }))
}

/// `PUT /filters/date-range`: Restrict start times to a window.
///
/// # Errors
///
/// Returns [`FeedError::InvalidFilter`] if `end` precedes `start`.
#[utoipa::path(
    put,
    path = "/api/v1/filters/date-range",
    tag = "Filters",
    summary = "Set date range",
    request_body = DateRangeRequest,
    responses(
        (status = 200, description = "Updated filters", body = FilterState),
        (status = 400, description = "End before start", body = ErrorResponse),
    )
)]
pub async fn set_date_range(
    State(state): State<AppState>,
    Json(req): Json<DateRangeRequest>,
) -> Result<impl IntoResponse, FeedError> {
    let filters = state.feed_service.set_date_range(req.start, req.end)?;
    Ok(Json(filters))
}

/// `DELETE /filters/date-range`: Remove the date window.
#[utoipa::path(
    delete,
    path = "/api/v1/filters/date-range",
    tag = "Filters",
    summary = "Clear date range",
    responses(
        (status = 200, description = "Updated filters", body = FilterState),
    )
)]
pub async fn clear_date_range(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.feed_service.clear_date_range())
}

/// `PUT /filters/radius`: Change the search radius.
///
/// # Errors
///
/// Returns [`FeedError::InvalidFilter`] for non-positive values.
#[utoipa::path(
    put,
    path = "/api/v1/filters/radius",
    tag = "Filters",
    summary = "Set radius",
    description = "Filters the current list once debounced and is sent with the next fetch. Does not trigger a fetch on its own.",
    request_body = RadiusRequest,
    responses(
        (status = 200, description = "Updated filters", body = FilterState),
        (status = 400, description = "Invalid radius", body = ErrorResponse),
    )
)]
pub async fn set_radius(
    State(state): State<AppState>,
    Json(req): Json<RadiusRequest>,
) -> Result<impl IntoResponse, FeedError> {
    let filters = state.feed_service.set_radius(req.radius_meters)?;
    Ok(Json(filters))
}

/// `DELETE /filters`: Clear search, categories and date range.
#[utoipa::path(
    delete,
    path = "/api/v1/filters",
    tag = "Filters",
    summary = "Clear filters",
    description = "Empties the search text, category set and date range. The radius is kept.",
    responses(
        (status = 200, description = "Cleared filters", body = FilterState),
    )
)]
pub async fn clear_filters(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.feed_service.clear_filters())
}

/// Filter routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/filters", get(get_filters).delete(clear_filters))
        .route("/filters/search", put(set_search))
        .route("/filters/categories/{category}/toggle", post(toggle_category))
        .route(
            "/filters/date-range",
            put(set_date_range).delete(clear_date_range),
        )
        .route("/filters/radius", put(set_radius))
}
