//! Filter editing DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Category, FilterState};

/// Request body for `PUT /api/v1/filters/search`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchTextRequest {
    /// New query; empty clears the text restriction.
    #[serde(default)]
    pub text: String,
}

/// Request body for `PUT /api/v1/filters/date-range`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DateRangeRequest {
    /// Inclusive lower bound on start time.
    pub start: DateTime<Utc>,
    /// Inclusive upper bound on start time.
    pub end: DateTime<Utc>,
}

/// Request body for `PUT /api/v1/filters/radius`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RadiusRequest {
    /// Radius in meters; must be positive.
    pub radius_meters: f64,
}

/// Response body for `POST /api/v1/filters/categories/{category}/toggle`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleCategoryResponse {
    /// The toggled category.
    pub category: Category,
    /// Whether it is selected after the toggle.
    pub selected: bool,
    /// Filter values after the toggle.
    pub filters: FilterState,
}

/// Entry of `GET /config/categories`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryInfo {
    /// Wire name of the category.
    pub category: Category,
    /// Display name.
    pub label: String,
}
