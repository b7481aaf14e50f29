//! Telemetry ingress endpoint handler.
//!
//! This is the HTTP face of the ingress listener: the broker rule (or a
//! test client) POSTs the device's JSON document here and the relay fans
//! it out to subscribed WebSocket connections.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::IngestResponse;
use crate::app_state::AppState;
use crate::domain::TelemetryMessage;
use crate::error::{ErrorResponse, RelayError};

/// `POST /api/v1/ingest` — Accept one telemetry message and fan it out.
///
/// The body must carry an `mqttTopic` field whose last path segment is the
/// device identifier; all other fields are opaque and delivered verbatim.
///
/// # Errors
///
/// Returns [`RelayError::InvalidMessage`] when no device identifier can be
/// extracted; the message is dropped and nothing is delivered.
#[utoipa::path(
    post,
    path = "/api/v1/ingest",
    tag = "Ingress",
    summary = "Ingest a telemetry message",
    description = "Accepts a device telemetry JSON document keyed by its `mqttTopic` \
        field and delivers it to every WebSocket connection subscribed to the \
        originating device. Delivery is best-effort at-most-once per connection.",
    request_body = serde_json::Value,
    responses(
        (status = 202, description = "Message accepted and relayed", body = IngestResponse),
        (status = 400, description = "No device identifier extractable", body = ErrorResponse),
    )
)]
pub async fn ingest_handler(
    State(state): State<AppState>,
    Json(raw): Json<serde_json::Value>,
) -> Result<impl IntoResponse, RelayError> {
    let message = TelemetryMessage::from_value(raw, state.config.topic_prefix.as_deref())?;
    let report = state.relay.relay(&message).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(IngestResponse::from_report(message.device_id().as_str(), report)),
    ))
}

/// Ingress routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ingest", post(ingest_handler))
}
