//! End-to-end tests over real HTTP and WebSocket transports.
//!
//! Each test boots the full router on an ephemeral port, drives it with
//! `reqwest` (ingest, registry, health) and `tokio-tungstenite` (dashboard
//! side), and asserts the observable relay behavior.

#![allow(clippy::panic, clippy::indexing_slicing)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use telemetry_relay::api;
use telemetry_relay::app_state::AppState;
use telemetry_relay::config::RelayConfig;
use telemetry_relay::domain::SubscriptionRegistry;
use telemetry_relay::service::{ConnectionLifecycle, RelayService};
use telemetry_relay::ws::handler::ws_handler;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Boots the relay on an ephemeral port and returns its address.
async fn spawn_relay(topic_prefix: Option<&str>) -> SocketAddr {
    let Ok(listen_addr) = "127.0.0.1:0".parse() else {
        panic!("valid bind address");
    };
    let config = RelayConfig {
        listen_addr,
        topic_prefix: topic_prefix.map(str::to_string),
        max_connections: 64,
        delivery_queue_capacity: 32,
    };

    let registry = Arc::new(SubscriptionRegistry::new(config.max_connections));
    let lifecycle = ConnectionLifecycle::new(Arc::clone(&registry));
    let relay = Arc::new(RelayService::new(Arc::clone(&registry), lifecycle.clone()));
    let app_state = AppState {
        config,
        registry,
        lifecycle,
        relay,
    };

    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .with_state(app_state);

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Opens a WebSocket to the relay.
async fn connect_ws(addr: SocketAddr) -> WsClient {
    let Ok((ws, _)) = connect_async(format!("ws://{addr}/ws")).await else {
        panic!("ws connect failed");
    };
    ws
}

/// Sends a subscribe action and asserts the ok status response.
async fn subscribe(ws: &mut WsClient, device_id: &str) {
    let frame = json!({"action": "subscribeDevice", "device_id": device_id}).to_string();
    let Ok(()) = ws.send(Message::text(frame)).await else {
        panic!("subscribe send failed");
    };
    let Some(Ok(reply)) = ws.next().await else {
        panic!("no subscribe response");
    };
    let Ok(text) = reply.into_text() else {
        panic!("non-text subscribe response");
    };
    assert!(text.contains(r#""status":"ok""#), "unexpected reply: {text}");
}

/// Reads the next text frame with a timeout.
async fn next_text(ws: &mut WsClient) -> String {
    let frame = tokio::time::timeout(Duration::from_secs(5), ws.next()).await;
    let Ok(Some(Ok(msg))) = frame else {
        panic!("no frame within timeout");
    };
    let Ok(text) = msg.into_text() else {
        panic!("non-text frame");
    };
    text.to_string()
}

/// Asserts no frame arrives within a short window.
async fn assert_silent(ws: &mut WsClient) {
    let frame = tokio::time::timeout(Duration::from_millis(300), ws.next()).await;
    assert!(frame.is_err(), "unexpected frame: {frame:?}");
}

async fn post_ingest(addr: SocketAddr, body: &Value) -> (reqwest::StatusCode, Value) {
    let client = reqwest::Client::new();
    let Ok(response) = client
        .post(format!("http://{addr}/api/v1/ingest"))
        .json(body)
        .send()
        .await
    else {
        panic!("ingest request failed");
    };
    let status = response.status();
    let Ok(json) = response.json::<Value>().await else {
        panic!("non-JSON ingest response");
    };
    (status, json)
}

#[tokio::test]
async fn subscribed_connection_receives_message_verbatim() {
    let addr = spawn_relay(None).await;
    let mut ws = connect_ws(addr).await;
    subscribe(&mut ws, "RFID-Device-01").await;

    let document = json!({
        "mqttTopic": "smaket/iot/data/RFID-Device-01",
        "temperature": 24.5,
        "humidity": 48.0,
        "message_id": "msg_1700000000_1234",
    });
    let (status, body) = post_ingest(addr, &document).await;
    assert_eq!(status, reqwest::StatusCode::ACCEPTED);
    assert_eq!(body["device_id"], "RFID-Device-01");
    assert_eq!(body["matched"], 1);
    assert_eq!(body["delivered"], 1);

    let delivered = next_text(&mut ws).await;
    let Ok(parsed) = serde_json::from_str::<Value>(&delivered) else {
        panic!("delivered frame is not JSON");
    };
    assert_eq!(parsed, document);
}

#[tokio::test]
async fn fan_out_targets_only_matching_subscribers() {
    let addr = spawn_relay(None).await;
    let mut ws_a = connect_ws(addr).await;
    let mut ws_b = connect_ws(addr).await;
    subscribe(&mut ws_a, "dev1").await;
    subscribe(&mut ws_b, "dev2").await;

    let (status, body) = post_ingest(addr, &json!({"mqttTopic": "smaket/iot/data/dev1"})).await;
    assert_eq!(status, reqwest::StatusCode::ACCEPTED);
    assert_eq!(body["matched"], 1);

    let delivered = next_text(&mut ws_a).await;
    assert!(delivered.contains("dev1"));
    assert_silent(&mut ws_b).await;
}

#[tokio::test]
async fn topic_without_separator_is_rejected() {
    let addr = spawn_relay(None).await;
    let mut ws = connect_ws(addr).await;
    subscribe(&mut ws, "dev1").await;

    let (status, body) = post_ingest(addr, &json!({"mqttTopic": "dev1"})).await;
    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1001);
    assert_silent(&mut ws).await;
}

#[tokio::test]
async fn missing_topic_field_is_rejected() {
    let addr = spawn_relay(None).await;
    let (status, body) = post_ingest(addr, &json!({"temperature": 21.0})).await;
    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1001);
}

#[tokio::test]
async fn configured_prefix_rejects_foreign_topics() {
    let addr = spawn_relay(Some("smaket/iot/data")).await;

    let (ok_status, _) =
        post_ingest(addr, &json!({"mqttTopic": "smaket/iot/data/dev1"})).await;
    assert_eq!(ok_status, reqwest::StatusCode::ACCEPTED);

    let (bad_status, _) = post_ingest(addr, &json!({"mqttTopic": "other/path/dev1"})).await;
    assert_eq!(bad_status, reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unsubscribe_stops_delivery() {
    let addr = spawn_relay(None).await;
    let mut ws = connect_ws(addr).await;
    subscribe(&mut ws, "dev1").await;

    let frame = json!({"action": "unsubscribeDevice", "device_id": "dev1"}).to_string();
    let Ok(()) = ws.send(Message::text(frame)).await else {
        panic!("unsubscribe send failed");
    };
    let reply = next_text(&mut ws).await;
    assert!(reply.contains(r#""status":"ok""#));

    let (_, body) = post_ingest(addr, &json!({"mqttTopic": "smaket/iot/data/dev1"})).await;
    assert_eq!(body["matched"], 0);
    assert_silent(&mut ws).await;
}

#[tokio::test]
async fn malformed_action_frame_gets_error_status() {
    let addr = spawn_relay(None).await;
    let mut ws = connect_ws(addr).await;

    let Ok(()) = ws.send(Message::text("not json".to_string())).await else {
        panic!("send failed");
    };
    let reply = next_text(&mut ws).await;
    assert!(reply.contains(r#""status":"error""#));
}

#[tokio::test]
async fn disconnect_removes_registry_record() {
    let addr = spawn_relay(None).await;
    let client = reqwest::Client::new();

    let mut ws = connect_ws(addr).await;
    subscribe(&mut ws, "dev1").await;

    // Registry shows the subscription
    let Ok(listed) = client
        .get(format!("http://{addr}/api/v1/connections"))
        .send()
        .await
    else {
        panic!("connections request failed");
    };
    let Ok(snapshot) = listed.json::<Value>().await else {
        panic!("non-JSON connections response");
    };
    assert_eq!(snapshot["total"], 1);
    assert_eq!(snapshot["connections"][0]["subscribed_devices"][0], "dev1");

    let Ok(()) = ws.close(None).await else {
        panic!("close failed");
    };
    drop(ws);

    // Cleanup is asynchronous; poll until the record disappears
    let mut total = -1_i64;
    for _ in 0..50 {
        let Ok(listed) = client
            .get(format!("http://{addr}/api/v1/connections"))
            .send()
            .await
        else {
            panic!("connections request failed");
        };
        let Ok(snapshot) = listed.json::<Value>().await else {
            panic!("non-JSON connections response");
        };
        total = snapshot["total"].as_i64().unwrap_or(-1);
        if total == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(total, 0);

    // A message for the departed subscriber goes nowhere, without error
    let (status, body) = post_ingest(addr, &json!({"mqttTopic": "smaket/iot/data/dev1"})).await;
    assert_eq!(status, reqwest::StatusCode::ACCEPTED);
    assert_eq!(body["matched"], 0);
    assert_eq!(body["delivered"], 0);
}

#[tokio::test]
async fn health_reports_ok() {
    let addr = spawn_relay(None).await;
    let Ok(response) = reqwest::get(format!("http://{addr}/health")).await else {
        panic!("health request failed");
    };
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let Ok(body) = response.json::<Value>().await else {
        panic!("non-JSON health response");
    };
    assert_eq!(body["status"], "healthy");
}
