//! WebSocket wire frames: client actions and status responses.
//!
//! Clients drive their subscriptions with small JSON action frames, e.g.
//! `{"action": "subscribeDevice", "device_id": "RFID-Device-01"}`.
//! Telemetry itself is not enveloped: subscribers receive the full ingress
//! document verbatim as a text frame.

use serde::{Deserialize, Serialize};

/// Actions a client can send over the socket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ClientRequest {
    /// Subscribe this connection to a device's telemetry.
    SubscribeDevice {
        /// Device identifier to subscribe to.
        device_id: String,
    },
    /// Unsubscribe this connection from a device's telemetry.
    UnsubscribeDevice {
        /// Device identifier to unsubscribe from.
        device_id: String,
    },
}

/// Success/failure status returned for every client action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusFrame {
    /// `"ok"` or `"error"`.
    pub status: StatusKind,
    /// Optional human-readable detail (error reason, confirmation text).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Status discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Action applied.
    Ok,
    /// Action rejected; see `detail`.
    Error,
}

impl StatusFrame {
    /// Builds a success frame with a confirmation detail.
    #[must_use]
    pub fn ok(detail: impl Into<String>) -> Self {
        Self {
            status: StatusKind::Ok,
            detail: Some(detail.into()),
        }
    }

    /// Builds an error frame with a reason.
    #[must_use]
    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            status: StatusKind::Error,
            detail: Some(detail.into()),
        }
    }

    /// Serializes the frame to JSON text.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
