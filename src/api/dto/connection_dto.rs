//! DTOs for the registry inspection endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ConnectionSnapshot;

/// One registry record as exposed to operators.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConnectionDto {
    /// Connection identifier.
    pub connection_id: uuid::Uuid,
    /// Subscribed device identifiers, sorted.
    pub subscribed_devices: Vec<String>,
    /// When the connection record was created.
    pub connected_at: DateTime<Utc>,
}

impl From<ConnectionSnapshot> for ConnectionDto {
    fn from(snapshot: ConnectionSnapshot) -> Self {
        Self {
            connection_id: *snapshot.connection_id.as_uuid(),
            subscribed_devices: snapshot.subscribed_devices,
            connected_at: snapshot.connected_at,
        }
    }
}

/// Response body for the registry listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConnectionListResponse {
    /// Current registry records.
    pub connections: Vec<ConnectionDto>,
    /// Total number of records.
    pub total: usize,
}
