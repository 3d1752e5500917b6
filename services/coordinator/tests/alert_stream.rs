//! Alert push channel integration tests.
//!
//! Connects real WebSocket listeners and checks fan-out, late joiners and
//! origin exclusion on the inventory relay.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use relief_coordinator::{api, state::AppState};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Harness {
    addr: String,
    client: reqwest::Client,
    state: AppState,
}

impl Harness {
    async fn start() -> Self {
        let state = AppState::default();
        let app = api::create_router(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            addr,
            client: reqwest::Client::new(),
            state,
        }
    }

    async fn listen(&self) -> Socket {
        let (socket, _) = connect_async(format!("ws://{}/v1/alerts/stream", self.addr))
            .await
            .unwrap();
        socket
    }

    async fn broadcast(&self, message: &str, severity: &str) -> Value {
        let resp = self
            .client
            .post(format!("http://{}/v1/alerts/broadcast", self.addr))
            .json(&json!({ "message": message, "severity": severity }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        resp.json().await.unwrap()
    }
}

/// Next JSON text frame, or `None` if nothing arrives shortly.
async fn next_frame(socket: &mut Socket) -> Option<Value> {
    loop {
        let msg = timeout(Duration::from_millis(300), socket.next()).await.ok()??;
        match msg.ok()? {
            Message::Text(text) => return serde_json::from_str(text.as_str()).ok(),
            Message::Close(_) => return None,
            _ => continue,
        }
    }
}

#[tokio::test]
async fn broadcast_reaches_connected_listeners_only() {
    let h = Harness::start().await;
    let mut first = h.listen().await;
    let mut second = h.listen().await;

    let ack = h.broadcast("Flood", "critical").await;
    assert_eq!(ack["status"], "Broadcast Sent");
    assert_eq!(ack["listeners"], 2);

    let mut late = h.listen().await;

    for socket in [&mut first, &mut second] {
        let frame = next_frame(socket).await.expect("listener missed the alert");
        assert_eq!(frame["channel"], "broadcast-alert");
        assert_eq!(frame["data"]["message"], "Flood");
        assert_eq!(frame["data"]["severity"], "critical");
        assert!(frame["data"]["timestamp"].is_string());
    }
    assert!(next_frame(&mut late).await.is_none());
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let h = Harness::start().await;
    let resp = h
        .client
        .post(format!("http://{}/v1/alerts/broadcast", h.addr))
        .json(&json!({ "message": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "invalid_message");
}

#[tokio::test]
async fn inventory_relay_skips_the_sender() {
    let h = Harness::start().await;
    let mut sender = h.listen().await;
    let mut other = h.listen().await;
    let camp_id = relief_id::CampId::new();

    sender
        .send(Message::Text(
            json!({
                "type": "update-inventory",
                "camp_id": camp_id,
                "camp_name": "Relief Camp A",
                "item": "Water"
            })
            .to_string()
            .into(),
        ))
        .await
        .unwrap();

    let frame = next_frame(&mut other).await.expect("relay not delivered");
    assert_eq!(frame["channel"], "inventory-alert");
    assert_eq!(frame["data"]["camp_id"], camp_id.to_string());
    assert_eq!(frame["data"]["message"], "Alert: Water level changed at Relief Camp A");

    assert!(next_frame(&mut sender).await.is_none());
}

#[tokio::test]
async fn disconnect_unregisters_listener() {
    let h = Harness::start().await;
    let socket = h.listen().await;
    assert_eq!(h.state.alerts().listener_count(), 1);

    drop(socket);
    for _ in 0..50 {
        if h.state.alerts().listener_count() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(h.state.alerts().listener_count(), 0);
}

#[tokio::test]
async fn close_ends_streams() {
    let h = Harness::start().await;
    let mut socket = h.listen().await;

    h.state.alerts().close();
    assert!(next_frame(&mut socket).await.is_none());
}
