//! Fan-out relay: delivers each telemetry message to every subscribed
//! connection.
//!
//! Delivery is best-effort at-most-once per live connection: one
//! non-blocking push onto the target's outbound queue, no retry, no
//! ordering guarantee across targets, no acknowledgments. Failures are
//! classified per target — a closed queue means the connection is gone and
//! its record is pruned; a full queue is a transient failure that skips
//! only that target.

use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;

use super::ConnectionLifecycle;
use crate::domain::{DeliveryTarget, SubscriptionRegistry, TelemetryMessage};
use crate::error::RelayError;

/// Outcome of relaying one message, for logging and the ingest response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Connections subscribed to the device at snapshot time.
    pub matched: usize,
    /// Deliveries accepted onto an outbound queue.
    pub delivered: usize,
    /// Targets found gone and removed from the registry.
    pub pruned: usize,
    /// Transient failures (target skipped, record kept).
    pub failed: usize,
}

/// Fans inbound telemetry out to subscribed connections.
#[derive(Debug, Clone)]
pub struct RelayService {
    registry: Arc<SubscriptionRegistry>,
    lifecycle: ConnectionLifecycle,
}

impl RelayService {
    /// Creates a new relay over the shared registry and lifecycle manager.
    #[must_use]
    pub fn new(registry: Arc<SubscriptionRegistry>, lifecycle: ConnectionLifecycle) -> Self {
        Self {
            registry,
            lifecycle,
        }
    }

    /// Relays one message to every connection subscribed to its device.
    ///
    /// Targets are resolved from a registry snapshot taken at call time;
    /// a subscription changing concurrently may or may not be reflected.
    ///
    /// # Errors
    ///
    /// This method itself only fails before any delivery is attempted;
    /// per-target failures are classified and absorbed into the report.
    /// Message validation errors ([`RelayError::InvalidMessage`]) are
    /// raised by [`TelemetryMessage`] construction, before `relay` is
    /// reachable.
    pub async fn relay(&self, message: &TelemetryMessage) -> Result<DeliveryReport, RelayError> {
        let device_id = message.device_id();
        let targets = self.registry.targets_for(device_id).await;

        let mut report = DeliveryReport {
            matched: targets.len(),
            ..DeliveryReport::default()
        };
        if targets.is_empty() {
            tracing::debug!(%device_id, "no subscribers");
            return Ok(report);
        }

        let text = message.to_text();
        for target in targets {
            match deliver(&target, &text) {
                Ok(()) => report.delivered += 1,
                Err(RelayError::ConnectionGone(id)) => {
                    self.lifecycle.on_connection_gone(id).await;
                    report.pruned += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        connection_id = %target.connection_id,
                        %err,
                        "delivery failed, skipping target"
                    );
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            %device_id,
            matched = report.matched,
            delivered = report.delivered,
            pruned = report.pruned,
            failed = report.failed,
            "relayed message"
        );
        Ok(report)
    }
}

/// Attempts one non-blocking delivery to a target's outbound queue.
///
/// A closed channel is the definitive gone signal; a full queue is a
/// transient failure.
fn deliver(target: &DeliveryTarget, text: &str) -> Result<(), RelayError> {
    match target.sender.try_send(text.to_string()) {
        Ok(()) => Ok(()),
        Err(TrySendError::Closed(_)) => Err(RelayError::ConnectionGone(target.connection_id)),
        Err(TrySendError::Full(_)) => Err(RelayError::DeliveryFailed {
            connection_id: target.connection_id,
            reason: "outbound queue full".to_string(),
        }),
    }
}
