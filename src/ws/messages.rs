//! WebSocket message types: envelope and commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a server message stamped with the current time.
    #[must_use]
    pub fn new(id: String, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error message answering request `id`.
    #[must_use]
    pub fn error(id: String, code: u16, message: &str) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message }),
        )
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send over WebSocket, carried in the
/// envelope's `payload`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Subscribe to notice kinds.
    Subscribe {
        /// Kinds to subscribe to, e.g. `"feed_updated"`. Use `["*"]` for all.
        topics: Vec<String>,
    },
    /// Unsubscribe from notice kinds.
    Unsubscribe {
        /// Kinds to unsubscribe from.
        topics: Vec<String>,
    },
    /// Return the current feed.
    GetFeed,
    /// Ask for an immediate fetch.
    Refresh,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn command_parses_from_payload() {
        let payload = serde_json::json!({ "command": "subscribe", "topics": ["*"] });
        let Ok(WsCommand::Subscribe { topics }) = serde_json::from_value::<WsCommand>(payload)
        else {
            panic!("expected subscribe");
        };
        assert_eq!(topics, vec!["*".to_string()]);

        let payload = serde_json::json!({ "command": "get_feed" });
        assert!(matches!(
            serde_json::from_value::<WsCommand>(payload),
            Ok(WsCommand::GetFeed)
        ));
    }

    #[test]
    fn envelope_uses_type_key() {
        let msg = WsMessage::error("r1".to_string(), 400, "bad");
        let Ok(json) = serde_json::to_value(&msg) else {
            panic!("serializable");
        };
        assert_eq!(json["type"], "error");
        assert_eq!(json["payload"]["code"], 400);
    }
}
