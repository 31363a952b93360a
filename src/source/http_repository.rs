//! HTTP implementation of [`EventRepository`] backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};

use super::{EventRepository, RepositoryError};
use crate::domain::{Event, Position};

/// Path of the nearby-events endpoint, relative to the API base URL.
const NEARBY_PATH: &str = "events/nearby";

/// Fetches events from `GET {base}/events/nearby?latitude=..&longitude=..&radius=..`.
#[derive(Debug, Clone)]
pub struct HttpEventRepository {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpEventRepository {
    /// Builds a repository for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::InvalidEndpoint`] if `base_url` is not an
    /// absolute http(s) URL, or [`RepositoryError::Transport`] if the HTTP
    /// client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RepositoryError> {
        let endpoint = nearby_endpoint(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    /// Returns the fully resolved nearby-events URL.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn nearby_endpoint(base_url: &str) -> Result<Url, RepositoryError> {
    // A trailing slash keeps any base path segment when joining.
    let mut raw = base_url.trim().trim_end_matches('/').to_string();
    raw.push('/');
    let base = Url::parse(&raw)
        .map_err(|e| RepositoryError::InvalidEndpoint(format!("{base_url}: {e}")))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(RepositoryError::InvalidEndpoint(format!(
            "{base_url}: unsupported scheme {}",
            base.scheme()
        )));
    }
    base.join(NEARBY_PATH)
        .map_err(|e| RepositoryError::InvalidEndpoint(format!("{base_url}: {e}")))
}

#[async_trait]
impl EventRepository for HttpEventRepository {
    async fn fetch_nearby(
        &self,
        position: Position,
        radius_meters: f64,
    ) -> Result<Vec<Event>, RepositoryError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("latitude", position.latitude),
                ("longitude", position.longitude),
                ("radius", radius_meters),
            ])
            .send()
            .await
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(RepositoryError::Unauthorized);
        }
        if !status.is_success() {
            return Err(RepositoryError::Server {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RepositoryError::MalformedResponse(e.to_string()))?;
        let events: Vec<Event> =
            serde_json::from_slice(&body).map_err(|e| RepositoryError::Decode(e.to_string()))?;

        tracing::debug!(count = events.len(), "decoded nearby events");
        Ok(events)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::extract::Query;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::get;
    use std::collections::HashMap;
    use std::net::SocketAddr;

    async fn serve(router: Router) -> SocketAddr {
        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        addr
    }

    fn repo(addr: SocketAddr) -> HttpEventRepository {
        let Ok(repo) = HttpEventRepository::new(&format!("http://{addr}"), Duration::from_secs(5))
        else {
            panic!("valid repository");
        };
        repo
    }

    fn origin() -> Position {
        let Ok(p) = Position::new(52.52, 13.405) else {
            panic!("valid position");
        };
        p
    }

    const ONE_EVENT: &str = r#"[{
        "id": "e1", "host_id": "h1", "title": "Picnic", "description": "In the park",
        "category": "outdoors",
        "location": {"name": "Park", "address": "Tiergarten", "latitude": 52.51, "longitude": 13.35},
        "start_time": "2026-07-01T10:00:00Z", "end_time": "2026-07-01T14:00:00Z",
        "current_attendees": 3, "status": "upcoming",
        "created_at": "2026-06-01T00:00:00Z", "updated_at": "2026-06-02T00:00:00Z"
    }]"#;

    #[test]
    fn endpoint_keeps_base_path() {
        let Ok(url) = nearby_endpoint("https://api.example.com/v2") else {
            panic!("valid base");
        };
        assert_eq!(url.as_str(), "https://api.example.com/v2/events/nearby");
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            nearby_endpoint("not a url"),
            Err(RepositoryError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            nearby_endpoint("ftp://example.com"),
            Err(RepositoryError::InvalidEndpoint(_))
        ));
    }

    #[tokio::test]
    async fn decodes_events_and_sends_query() {
        let router = Router::new().route(
            "/events/nearby",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                let radius = q.get("radius").and_then(|r| r.parse::<f64>().ok());
                if radius == Some(2_500.0)
                    && q.contains_key("latitude")
                    && q.contains_key("longitude")
                {
                    (AxumStatus::OK, ONE_EVENT.to_string())
                } else {
                    (AxumStatus::BAD_REQUEST, String::new())
                }
            }),
        );
        let addr = serve(router).await;

        let Ok(events) = repo(addr).fetch_nearby(origin(), 2_500.0).await else {
            panic!("fetch should succeed");
        };
        assert_eq!(events.len(), 1);
        assert_eq!(events.first().map(|e| e.title.as_str()), Some("Picnic"));
    }

    #[tokio::test]
    async fn maps_unauthorized() {
        let router = Router::new().route(
            "/events/nearby",
            get(|| async { AxumStatus::UNAUTHORIZED }),
        );
        let addr = serve(router).await;
        let result = repo(addr).fetch_nearby(origin(), 1_000.0).await;
        assert_eq!(result, Err(RepositoryError::Unauthorized));
    }

    #[tokio::test]
    async fn maps_server_error_status() {
        let router = Router::new().route(
            "/events/nearby",
            get(|| async { AxumStatus::SERVICE_UNAVAILABLE }),
        );
        let addr = serve(router).await;
        let result = repo(addr).fetch_nearby(origin(), 1_000.0).await;
        assert_eq!(result, Err(RepositoryError::Server { status: 503 }));
    }

    #[tokio::test]
    async fn maps_decode_failure() {
        let router = Router::new().route("/events/nearby", get(|| async { "{\"oops\": true}" }));
        let addr = serve(router).await;
        let result = repo(addr).fetch_nearby(origin(), 1_000.0).await;
        assert!(matches!(result, Err(RepositoryError::Decode(_))));
    }
}
