//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::domain::SubscriptionRegistry;
use crate::service::{ConnectionLifecycle, RelayService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: RelayConfig,
    /// Subscription registry, the single source of truth for targeting.
    pub registry: Arc<SubscriptionRegistry>,
    /// Connection lifecycle manager.
    pub lifecycle: ConnectionLifecycle,
    /// Fan-out relay for inbound telemetry.
    pub relay: Arc<RelayService>,
}
