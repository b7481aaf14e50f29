//! DTOs for the telemetry ingress endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::service::DeliveryReport;

/// Response body for an accepted ingress message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngestResponse {
    /// Device identifier resolved from the message topic.
    pub device_id: String,
    /// Connections subscribed to the device at snapshot time.
    pub matched: usize,
    /// Deliveries accepted onto an outbound queue.
    pub delivered: usize,
    /// Targets found gone and pruned from the registry.
    pub pruned: usize,
    /// Transient delivery failures (skipped, no retry).
    pub failed: usize,
    /// When the message was accepted.
    pub accepted_at: DateTime<Utc>,
}

impl IngestResponse {
    /// Builds a response from a relay [`DeliveryReport`].
    #[must_use]
    pub fn from_report(device_id: &str, report: DeliveryReport) -> Self {
        Self {
            device_id: device_id.to_string(),
            matched: report.matched,
            delivered: report.delivered,
            pruned: report.pruned,
            failed: report.failed,
            accepted_at: Utc::now(),
        }
    }
}
