//! Alert API endpoints.
//!
//! - POST /v1/alerts/broadcast
//! - GET /v1/alerts/stream (WebSocket push channel)

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use relief_events::{ClientFrame, Severity};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::alerts::Subscription;
use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/broadcast", post(broadcast_alert))
        .route("/stream", get(alert_stream))
}

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub message: String,
    #[serde(default)]
    pub severity: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BroadcastAck {
    pub status: &'static str,
    pub listeners: usize,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

/// POST /v1/alerts/broadcast
///
/// Listeners that are not connected right now never see the alert.
async fn broadcast_alert(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(req): Json<BroadcastRequest>,
) -> Result<Json<BroadcastAck>, ApiError> {
    let severity = match req.severity.as_deref() {
        Some(raw) => raw.parse().map_err(|e: relief_events::EventError| {
            ApiError::bad_request("invalid_severity", e.to_string())
                .with_request_id(ctx.request_id.clone())
        })?,
        None => Severity::default(),
    };

    let receipt = state
        .alerts()
        .broadcast(&req.message, severity)
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;

    Ok(Json(BroadcastAck {
        status: "Broadcast Sent",
        listeners: receipt.delivered_to,
        severity: receipt.event.severity,
        timestamp: receipt.event.timestamp,
    }))
}

/// GET /v1/alerts/stream
///
/// The listener is registered before the upgrade completes, so anything
/// broadcast after the handshake reaches it.
async fn alert_stream(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let subscription = state.alerts().subscribe();
    ws.on_upgrade(move |socket| handle_alert_socket(socket, state, subscription))
}

async fn handle_alert_socket(socket: WebSocket, state: AppState, mut subscription: Subscription) {
    let listener_id = subscription.id();
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            frame = subscription.recv() => {
                let Some(frame) = frame else {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                };
                let text = match frame.to_json() {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, listener_id = %listener_id, "Failed to encode push frame");
                        continue;
                    }
                };
                if sender.send(Message::Text(text.into())).await.is_err() {
                    debug!(listener_id = %listener_id, "Alert listener went away mid-send");
                    break;
                }
            }
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => match ClientFrame::from_json(text.as_str()) {
                    Ok(ClientFrame::UpdateInventory { camp_id, camp_name, item }) => {
                        state
                            .alerts()
                            .relay_inventory_change(listener_id, camp_id, &camp_name, &item);
                    }
                    Err(e) => {
                        debug!(error = %e, listener_id = %listener_id, "Ignoring malformed client frame");
                    }
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    debug!(error = %e, listener_id = %listener_id, "Alert socket error");
                    break;
                }
            },
        }
    }

    state.alerts().unsubscribe(subscription);
    info!(listener_id = %listener_id, "Alert stream closed");
}
