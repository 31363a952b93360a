//! Service configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`), each with a default.

use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::DEFAULT_RADIUS_METERS;
use crate::engine::{DEFAULT_TIE_BREAK_METERS, EngineSettings};

/// Top-level service configuration.
///
/// Loaded once at startup via [`FeedConfig::from_env`].
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Base URL of the event backend.
    pub events_api_base_url: String,

    /// Per-request timeout for event backend calls.
    pub events_api_timeout: Duration,

    /// Quiescence window for filter edits.
    pub search_debounce: Duration,

    /// Quiescence window for position updates.
    pub location_debounce: Duration,

    /// Radius applied until the user picks another one, in meters.
    pub default_radius_meters: f64,

    /// Distance difference at or below which start time decides ordering.
    pub tie_break_meters: f64,

    /// Minimum movement before a position report is forwarded, in meters.
    pub min_movement_meters: f64,

    /// Capacity of the FeedBus broadcast channel.
    pub feed_bus_capacity: usize,

    /// Capacity of the engine command channel.
    pub command_buffer: usize,

    /// Emit logs as JSON lines instead of the human-readable format.
    pub log_json: bool,
}

impl FeedConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set or cannot be
    /// parsed. Calls `dotenvy::dotenv().ok()` to optionally load a `.env`
    /// file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let events_api_base_url = std::env::var("EVENTS_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.olec.app".to_string());
        let events_api_timeout = Duration::from_secs(parse_env("EVENTS_API_TIMEOUT_SECS", 10));

        let search_debounce = Duration::from_millis(parse_env("SEARCH_DEBOUNCE_MS", 300));
        let location_debounce = Duration::from_millis(parse_env("LOCATION_DEBOUNCE_MS", 1_000));

        let default_radius_meters =
            parse_positive_f64("DEFAULT_RADIUS_METERS", DEFAULT_RADIUS_METERS);
        let tie_break_meters = parse_positive_f64("TIE_BREAK_METERS", DEFAULT_TIE_BREAK_METERS);
        let min_movement_meters = parse_env("MIN_MOVEMENT_METERS", 10.0_f64).max(0.0);

        let feed_bus_capacity = parse_env("FEED_BUS_CAPACITY", 1_024);
        let command_buffer = parse_env("COMMAND_BUFFER", 64);

        let log_json = std::env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(Self {
            listen_addr,
            events_api_base_url,
            events_api_timeout,
            search_debounce,
            location_debounce,
            default_radius_meters,
            tie_break_meters,
            min_movement_meters,
            feed_bus_capacity,
            command_buffer,
            log_json,
        })
    }

    /// Engine settings derived from this configuration.
    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            filter_debounce: self.search_debounce,
            location_debounce: self.location_debounce,
            tie_break_meters: self.tie_break_meters,
            command_buffer: self.command_buffer,
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Like [`parse_env`] but also rejects non-finite and non-positive values.
fn parse_positive_f64(key: &str, default: f64) -> f64 {
    let value = parse_env(key, default);
    if value.is_finite() && value > 0.0 {
        value
    } else {
        tracing::warn!(key, value, default, "ignoring non-positive setting");
        default
    }
}
