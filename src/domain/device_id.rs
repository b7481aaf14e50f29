//! Validated device identifier.
//!
//! [`DeviceId`] wraps the string extracted from the last path segment of a
//! telemetry topic. Validation happens once at construction; everything
//! downstream (registry keys, subscription sets) can rely on a well-formed
//! identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// Maximum accepted device identifier length, in bytes.
pub const MAX_DEVICE_ID_LEN: usize = 128;

/// Identifier of a telemetry-producing device.
///
/// Must be non-empty, at most [`MAX_DEVICE_ID_LEN`] bytes, and consist of
/// ASCII alphanumerics plus `-`, `_` and `.` (e.g. `RFID-Device-01`).
/// Topic separators are rejected so an id can never smuggle extra path
/// segments back into a topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Parses and validates a device identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidMessage`] if the string is empty, too
    /// long, or contains a character outside the allowed set.
    pub fn parse(raw: &str) -> Result<Self, RelayError> {
        if raw.is_empty() {
            return Err(RelayError::InvalidMessage(
                "empty device identifier".to_string(),
            ));
        }
        if raw.len() > MAX_DEVICE_ID_LEN {
            return Err(RelayError::InvalidMessage(format!(
                "device identifier exceeds {MAX_DEVICE_ID_LEN} bytes"
            )));
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(RelayError::InvalidMessage(format!(
                "invalid character {bad:?} in device identifier"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for DeviceId {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
