//! Location DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::source::AuthorizationState;

/// Request body for `POST /api/v1/location`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PositionReport {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// Response body for `POST /api/v1/location`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PositionReportResponse {
    /// `false` when the report was dropped (no permission or too little
    /// movement).
    pub accepted: bool,
}

/// Request and response body for `PUT /api/v1/location/authorization`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthorizationBody {
    /// Permission state.
    pub authorization: AuthorizationState,
    /// Whether the state changed; ignored on input.
    #[serde(default)]
    pub changed: bool,
}
