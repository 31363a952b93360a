//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding subscribed notices.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::api::dto::FeedResponse;
use crate::domain::{FeedUpdate, UpdateKind};
use crate::service::FeedService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards notices from the [`broadcast::Receiver`] whose kind the
///   client subscribed to.
pub async fn run_connection(
    socket: WebSocket,
    mut update_rx: broadcast::Receiver<FeedUpdate>,
    feed_service: Arc<FeedService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs, &feed_service).await;
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            update = update_rx.recv() => {
                match update {
                    Ok(update) => {
                        if !subs.matches(update.kind()) {
                            continue;
                        }
                        let Some(json) = encode_update(&update) else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind feed bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

fn encode_update(update: &FeedUpdate) -> Option<String> {
    let payload = match serde_json::to_value(update) {
        Ok(payload) => payload,
        Err(error) => {
            tracing::warn!(%error, kind = %update.kind(), "failed to encode feed update");
            return None;
        }
    };
    let msg = WsMessage::new(uuid::Uuid::new_v4().to_string(), WsMessageType::Event, payload);
    serde_json::to_string(&msg).ok()
}

/// Splits topic names into known kinds, the wildcard flag and rejects.
fn parse_topics(topics: &[String]) -> (Vec<UpdateKind>, bool, Vec<String>) {
    let mut kinds = Vec::new();
    let mut wildcard = false;
    let mut rejected = Vec::new();
    for topic in topics {
        if topic == "*" {
            wildcard = true;
        } else if let Ok(kind) = topic.parse::<UpdateKind>() {
            kinds.push(kind);
        } else {
            rejected.push(topic.clone());
        }
    }
    (kinds, wildcard, rejected)
}

/// Handles a text message from the client, returning an optional JSON response.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    feed_service: &FeedService,
) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return serde_json::to_string(&WsMessage::error(String::new(), 400, "malformed JSON")).ok();
    };

    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return serde_json::to_string(&WsMessage::error(msg.id, 404, "unknown command")).ok();
    };

    let response = match command {
        WsCommand::Subscribe { topics } => {
            let (kinds, wildcard, rejected) = parse_topics(&topics);
            subs.subscribe(&kinds, wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "subscribed": kinds.iter().map(UpdateKind::as_str).collect::<Vec<_>>(),
                    "rejected": rejected,
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { topics } => {
            let (kinds, wildcard, rejected) = parse_topics(&topics);
            subs.unsubscribe(&kinds, wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "unsubscribed": kinds.iter().map(UpdateKind::as_str).collect::<Vec<_>>(),
                    "rejected": rejected,
                    "remaining_count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::GetFeed => {
            let snapshot = feed_service.feed();
            let payload = serde_json::to_value(FeedResponse::from(&snapshot)).ok()?;
            WsMessage::new(msg.id, WsMessageType::Response, payload)
        }
        WsCommand::Refresh => match feed_service.refresh().await {
            Ok(()) => WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({ "status": "accepted" }),
            ),
            Err(error) => WsMessage::error(msg.id, 503, &error.to_string()),
        },
    };
    serde_json::to_string(&response).ok()
}
