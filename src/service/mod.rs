//! Service layer: connection lifecycle management and message fan-out.

pub mod lifecycle;
pub mod relay;

pub use lifecycle::ConnectionLifecycle;
pub use relay::{DeliveryReport, RelayService};
