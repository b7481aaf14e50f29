//! Registry inspection endpoint handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ConnectionDto, ConnectionListResponse};
use crate::app_state::AppState;

/// `GET /api/v1/connections` — Snapshot of all registry records.
///
/// Operator surface for inspecting which connections are live and what
/// each one subscribed to. The snapshot is best-effort relative to
/// concurrent connects, disconnects, and subscription changes.
#[utoipa::path(
    get,
    path = "/api/v1/connections",
    tag = "Connections",
    summary = "List live connections",
    description = "Returns a snapshot of every registry record: connection id, \
        subscribed devices, and creation time.",
    responses(
        (status = 200, description = "Registry snapshot", body = ConnectionListResponse),
    )
)]
pub async fn list_connections(State(state): State<AppState>) -> impl IntoResponse {
    let connections: Vec<ConnectionDto> = state
        .registry
        .list_all()
        .await
        .into_iter()
        .map(ConnectionDto::from)
        .collect();
    let total = connections.len();

    Json(ConnectionListResponse { connections, total })
}

/// Connection routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/connections", get(list_connections))
}
