//! Concurrent subscription registry.
//!
//! [`SubscriptionRegistry`] is the single source of truth for delivery
//! targeting: it maps each live connection to the devices it subscribed to,
//! and maintains a secondary index by device identifier so fan-out resolves
//! its targets without scanning the full table.
//!
//! # Concurrency
//!
//! All state sits behind one [`tokio::sync::RwLock`]. Mutations
//! (`create`, `subscribe`, `unsubscribe`, `remove`) take the write lock;
//! `targets_for` and `list_all` take the read lock and clone a snapshot out,
//! so a snapshot may be slightly stale relative to concurrent mutations.
//! That is acceptable: delivering to, or skipping, a connection whose
//! subscription just changed is within contract.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::sync::mpsc;

use super::{ConnectionId, DeviceId};
use crate::error::RelayError;

/// Outbound delivery channel handle for one connection.
///
/// The receiving end lives in the connection's writer task; a closed
/// channel is the definitive signal that the connection is gone.
pub type DeliverySender = mpsc::Sender<String>;

/// Registry record for one live connection.
#[derive(Debug)]
struct ConnectionRecord {
    subscribed_devices: HashSet<DeviceId>,
    sender: DeliverySender,
    connected_at: DateTime<Utc>,
}

/// One fan-out target resolved from the registry.
#[derive(Debug, Clone)]
pub struct DeliveryTarget {
    /// Target connection.
    pub connection_id: ConnectionId,
    /// Cloned channel handle for the delivery attempt.
    pub sender: DeliverySender,
}

/// Read-only view of one registry record.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionSnapshot {
    /// Connection identifier.
    pub connection_id: ConnectionId,
    /// Subscribed device identifiers, sorted for stable output.
    pub subscribed_devices: Vec<String>,
    /// When the connection record was created.
    pub connected_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    connections: HashMap<ConnectionId, ConnectionRecord>,
    by_device: HashMap<DeviceId, HashSet<ConnectionId>>,
}

/// Central store mapping live connections to their device subscriptions.
#[derive(Debug)]
pub struct SubscriptionRegistry {
    inner: RwLock<RegistryInner>,
    max_connections: usize,
}

impl SubscriptionRegistry {
    /// Creates an empty registry accepting at most `max_connections`
    /// concurrent records.
    #[must_use]
    pub fn new(max_connections: usize) -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
            max_connections,
        }
    }

    /// Inserts a record with an empty subscription set.
    ///
    /// Idempotent: if a record for `connection_id` already exists, the
    /// existing record is kept untouched and the call succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::RegistryUnavailable`] when the registry is at
    /// its connection capacity.
    pub async fn create(
        &self,
        connection_id: ConnectionId,
        sender: DeliverySender,
    ) -> Result<(), RelayError> {
        let mut inner = self.inner.write().await;
        if inner.connections.contains_key(&connection_id) {
            return Ok(());
        }
        if inner.connections.len() >= self.max_connections {
            return Err(RelayError::RegistryUnavailable(format!(
                "connection capacity {} reached",
                self.max_connections
            )));
        }
        inner.connections.insert(
            connection_id,
            ConnectionRecord {
                subscribed_devices: HashSet::new(),
                sender,
                connected_at: Utc::now(),
            },
        );
        Ok(())
    }

    /// Adds `device_id` to the connection's subscription set.
    ///
    /// Duplicate subscriptions are no-ops (set semantics). Returns the size
    /// of the subscription set after the call.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ConnectionNotFound`] if no record exists for
    /// `connection_id`.
    pub async fn subscribe(
        &self,
        connection_id: ConnectionId,
        device_id: DeviceId,
    ) -> Result<usize, RelayError> {
        let mut inner = self.inner.write().await;
        let Some(record) = inner.connections.get_mut(&connection_id) else {
            return Err(RelayError::ConnectionNotFound(connection_id));
        };
        let newly_added = record.subscribed_devices.insert(device_id.clone());
        let count = record.subscribed_devices.len();
        if newly_added {
            inner
                .by_device
                .entry(device_id)
                .or_default()
                .insert(connection_id);
        }
        Ok(count)
    }

    /// Removes `device_id` from the connection's subscription set.
    ///
    /// Removing a device the connection never subscribed to is a no-op.
    /// Returns the size of the subscription set after the call.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ConnectionNotFound`] if no record exists for
    /// `connection_id`.
    pub async fn unsubscribe(
        &self,
        connection_id: ConnectionId,
        device_id: &DeviceId,
    ) -> Result<usize, RelayError> {
        let mut inner = self.inner.write().await;
        let Some(record) = inner.connections.get_mut(&connection_id) else {
            return Err(RelayError::ConnectionNotFound(connection_id));
        };
        let was_subscribed = record.subscribed_devices.remove(device_id);
        let count = record.subscribed_devices.len();
        if was_subscribed {
            detach_from_index(&mut inner.by_device, device_id, connection_id);
        }
        Ok(count)
    }

    /// Deletes the record for `connection_id`.
    ///
    /// Idempotent: removing an absent connection is not an error. Returns
    /// `true` if a record was actually removed.
    pub async fn remove(&self, connection_id: ConnectionId) -> bool {
        let mut inner = self.inner.write().await;
        let Some(record) = inner.connections.remove(&connection_id) else {
            return false;
        };
        for device_id in &record.subscribed_devices {
            detach_from_index(&mut inner.by_device, device_id, connection_id);
        }
        true
    }

    /// Resolves the connections currently subscribed to `device_id`.
    ///
    /// Returns a snapshot taken under the read lock; concurrent mutations
    /// may not be reflected.
    pub async fn targets_for(&self, device_id: &DeviceId) -> Vec<DeliveryTarget> {
        let inner = self.inner.read().await;
        let Some(ids) = inner.by_device.get(device_id) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| {
                inner.connections.get(id).map(|record| DeliveryTarget {
                    connection_id: *id,
                    sender: record.sender.clone(),
                })
            })
            .collect()
    }

    /// Returns a snapshot of all registry records.
    pub async fn list_all(&self) -> Vec<ConnectionSnapshot> {
        let inner = self.inner.read().await;
        let mut snapshots: Vec<ConnectionSnapshot> = inner
            .connections
            .iter()
            .map(|(id, record)| {
                let mut devices: Vec<String> = record
                    .subscribed_devices
                    .iter()
                    .map(|d| d.as_str().to_string())
                    .collect();
                devices.sort_unstable();
                ConnectionSnapshot {
                    connection_id: *id,
                    subscribed_devices: devices,
                    connected_at: record.connected_at,
                }
            })
            .collect();
        snapshots.sort_unstable_by_key(|s| s.connected_at);
        snapshots
    }

    /// Returns the number of live connection records.
    pub async fn len(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    /// Returns `true` if the registry holds no records.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.connections.is_empty()
    }
}

/// Drops `connection_id` from the device index entry, removing the entry
/// entirely once its last subscriber is gone.
fn detach_from_index(
    by_device: &mut HashMap<DeviceId, HashSet<ConnectionId>>,
    device_id: &DeviceId,
    connection_id: ConnectionId,
) {
    if let Some(ids) = by_device.get_mut(device_id) {
        ids.remove(&connection_id);
        if ids.is_empty() {
            by_device.remove(device_id);
        }
    }
}
