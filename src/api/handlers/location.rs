//! Location handlers: position reports and permission changes.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{post, put};
use axum::{Json, Router};

use crate::api::dto::{AuthorizationBody, PositionReport, PositionReportResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, FeedError};

/// `POST /location`: Report a position fix.
///
/// # Errors
///
/// Returns [`FeedError::InvalidPosition`] for out-of-range coordinates.
#[utoipa::path(
    post,
    path = "/api/v1/location",
    tag = "Location",
    summary = "Report position",
    description = "Feeds a device position into the engine. Reports are dropped while permission is denied or restricted, and when the device moved less than the minimum distance. A settled position triggers a fetch after the location debounce window.",
    request_body = PositionReport,
    responses(
        (status = 200, description = "Report processed", body = PositionReportResponse),
        (status = 400, description = "Invalid coordinates", body = ErrorResponse),
    )
)]
pub async fn report_position(
    State(state): State<AppState>,
    Json(req): Json<PositionReport>,
) -> Result<impl IntoResponse, FeedError> {
    let accepted = state
        .feed_service
        .report_position(req.latitude, req.longitude)?;
    Ok(Json(PositionReportResponse { accepted }))
}

/// `PUT /location/authorization`: Record a permission change.
#[utoipa::path(
    put,
    path = "/api/v1/location/authorization",
    tag = "Location",
    summary = "Set location permission",
    description = "Denied or restricted permission removes distance filtering and ranking; the feed falls back to start-time order.",
    request_body = AuthorizationBody,
    responses(
        (status = 200, description = "Permission recorded", body = AuthorizationBody),
    )
)]
pub async fn set_authorization(
    State(state): State<AppState>,
    Json(req): Json<AuthorizationBody>,
) -> impl IntoResponse {
    let changed = state.feed_service.set_authorization(req.authorization);
    Json(AuthorizationBody {
        authorization: req.authorization,
        changed,
    })
}

/// Location routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/location", post(report_position))
        .route("/location/authorization", put(set_authorization))
}
