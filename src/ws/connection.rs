//! Per-connection WebSocket loop.
//!
//! Each upgraded socket runs one loop that reads client action frames and
//! forwards queued telemetry deliveries. The outbound side is fed by the
//! fan-out relay through the connection's registry channel; dropping the
//! receiving end (loop exit) is what makes subsequent deliveries classify
//! the connection as gone.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::messages::{ClientRequest, StatusFrame};
use crate::app_state::AppState;
use crate::domain::{ConnectionId, DeviceId};

/// Runs the read/write loop for a single WebSocket connection.
///
/// Registers the connection before reading anything, then:
/// - dispatches client action frames (`subscribeDevice`, `unsubscribeDevice`);
/// - forwards queued deliveries to the socket, breaking on write failure.
///
/// The registry record is removed when the loop exits, whichever side
/// closed first.
pub async fn run_connection(socket: WebSocket, connection_id: ConnectionId, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::channel(state.config.delivery_queue_capacity);

    if let Err(err) = state.lifecycle.on_connect(connection_id, tx).await {
        tracing::warn!(%connection_id, %err, "rejecting connection");
        let _ = ws_tx
            .send(Message::text(StatusFrame::error(err.to_string()).to_json()))
            .await;
        let _ = ws_tx.close().await;
        return;
    }

    loop {
        tokio::select! {
            // Incoming frame from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_frame(&text, connection_id, &state).await;
                        if ws_tx.send(Message::text(response.to_json())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
            // Telemetry delivery from the relay
            outbound = rx.recv() => {
                match outbound {
                    Some(text) => {
                        if ws_tx.send(Message::text(text)).await.is_err() {
                            break;
                        }
                    }
                    // Registry record pruned; all senders dropped
                    None => break,
                }
            }
        }
    }

    state.lifecycle.on_disconnect(connection_id).await;
    tracing::debug!(%connection_id, "ws connection closed");
}

/// Handles one text frame from the client, returning the status response.
async fn handle_text_frame(text: &str, connection_id: ConnectionId, state: &AppState) -> StatusFrame {
    let request = match serde_json::from_str::<ClientRequest>(text) {
        Ok(request) => request,
        Err(err) => return StatusFrame::error(format!("malformed request: {err}")),
    };

    match request {
        ClientRequest::SubscribeDevice { device_id } => {
            let device = match DeviceId::parse(&device_id) {
                Ok(device) => device,
                Err(err) => return StatusFrame::error(err.to_string()),
            };
            match state.registry.subscribe(connection_id, device).await {
                Ok(count) => {
                    tracing::info!(%connection_id, device_id, count, "subscribed");
                    StatusFrame::ok(format!("subscribed to {device_id}"))
                }
                Err(err) => StatusFrame::error(err.to_string()),
            }
        }
        ClientRequest::UnsubscribeDevice { device_id } => {
            let device = match DeviceId::parse(&device_id) {
                Ok(device) => device,
                Err(err) => return StatusFrame::error(err.to_string()),
            };
            match state.registry.unsubscribe(connection_id, &device).await {
                Ok(count) => {
                    tracing::info!(%connection_id, device_id, count, "unsubscribed");
                    StatusFrame::ok(format!("unsubscribed from {device_id}"))
                }
                Err(err) => StatusFrame::error(err.to_string()),
            }
        }
    }
}
