//! Domain layer: identifiers, topic grammar, telemetry envelope, and the
//! subscription registry.
//!
//! This module contains the server-side domain model: connection and device
//! identity, the topic parsing contract, the immutable ingress message
//! envelope, and the concurrent registry that maps live connections to
//! their device subscriptions.

pub mod connection_id;
pub mod device_id;
pub mod registry;
pub mod telemetry;
pub mod topic;

pub use connection_id::ConnectionId;
pub use device_id::DeviceId;
pub use registry::{ConnectionSnapshot, DeliverySender, DeliveryTarget, SubscriptionRegistry};
pub use telemetry::TelemetryMessage;
