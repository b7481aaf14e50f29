//! Connection lifecycle management.
//!
//! [`ConnectionLifecycle`] owns the registry side of a connection's life:
//! a record is created when the transport reports a connect, and removed on
//! disconnect or when a delivery attempt proves the connection dead. The
//! registry record's presence is the connection state — once removed, a
//! connection never comes back under the same identifier.

use std::sync::Arc;

use crate::domain::{ConnectionId, DeliverySender, SubscriptionRegistry};
use crate::error::RelayError;

/// Creates and removes registry records in response to transport events
/// and dead-connection signals from the relay.
#[derive(Debug, Clone)]
pub struct ConnectionLifecycle {
    registry: Arc<SubscriptionRegistry>,
}

impl ConnectionLifecycle {
    /// Creates a new lifecycle manager over the shared registry.
    #[must_use]
    pub fn new(registry: Arc<SubscriptionRegistry>) -> Self {
        Self { registry }
    }

    /// Returns a reference to the shared [`SubscriptionRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    /// Handles a transport-level connect: inserts a registry record with an
    /// empty subscription set. Repeated connects for the same identifier
    /// keep the first record's effect.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::RegistryUnavailable`] when the registry is at
    /// capacity; the caller should close the socket.
    pub async fn on_connect(
        &self,
        connection_id: ConnectionId,
        sender: DeliverySender,
    ) -> Result<(), RelayError> {
        self.registry.create(connection_id, sender).await?;
        tracing::info!(%connection_id, "connection registered");
        Ok(())
    }

    /// Handles a transport-level disconnect: removes the registry record.
    /// Idempotent; removing an already-absent connection is not an error.
    pub async fn on_disconnect(&self, connection_id: ConnectionId) {
        if self.registry.remove(connection_id).await {
            tracing::info!(%connection_id, "connection removed");
        } else {
            tracing::debug!(%connection_id, "disconnect for unknown connection");
        }
    }

    /// Handles a dead-connection signal from the fan-out relay: same
    /// cleanup path as a disconnect, reached via delivery-failure
    /// classification instead of a transport event.
    pub async fn on_connection_gone(&self, connection_id: ConnectionId) {
        if self.registry.remove(connection_id).await {
            tracing::warn!(%connection_id, "pruned gone connection");
        }
    }
}
