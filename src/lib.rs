//! # telemetry-relay
//!
//! Telemetry ingestion and WebSocket fan-out relay for IoT device streams.
//!
//! Devices publish JSON documents keyed by an MQTT-style topic whose last
//! path segment is the device identifier. Dashboard clients open a
//! WebSocket, subscribe to the devices they care about, and receive each
//! matching document verbatim. Delivery is best-effort at-most-once per
//! live connection; a dead connection is pruned from the registry the
//! first time a delivery proves it gone.
//!
//! ## Architecture
//!
//! ```text
//! Devices (HTTP ingest)        Dashboards (WebSocket)
//!     │                            │
//!     ├── Ingest Handler (api/)    ├── WS Handler (ws/)
//!     │                            │
//!     ├── RelayService (service/)  ├── ConnectionLifecycle (service/)
//!     │                            │
//!     └──── SubscriptionRegistry (domain/) ────┘
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;
