//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Required topic prefix for ingress messages (e.g. `smaket/iot/data`).
    /// When unset, any topic matching the `prefix/.../{deviceId}` grammar
    /// is accepted.
    pub topic_prefix: Option<String>,

    /// Maximum number of concurrent connection records in the registry.
    pub max_connections: usize,

    /// Capacity of each connection's outbound delivery queue. A full queue
    /// counts as a transient delivery failure for that message.
    pub delivery_queue_capacity: usize,
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let topic_prefix = std::env::var("TOPIC_PREFIX")
            .ok()
            .map(|p| p.trim_end_matches('/').to_string())
            .filter(|p| !p.is_empty());

        let max_connections = parse_env("MAX_CONNECTIONS", 10_000);
        let delivery_queue_capacity = parse_env("DELIVERY_QUEUE_CAPACITY", 256);

        Ok(Self {
            listen_addr,
            topic_prefix,
            max_connections,
            delivery_queue_capacity,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_falls_back_on_missing() {
        let value: usize = parse_env("TELEMETRY_RELAY_TEST_UNSET_VAR", 42);
        assert_eq!(value, 42);
    }
}
