//! Telemetry topic parsing.
//!
//! Topics follow the grammar `prefix/.../{deviceId}`: one or more
//! `/`-separated segments followed by the device identifier as the last
//! segment (e.g. `smaket/iot/data/RFID-Device-01`). Malformed topics are
//! rejected deterministically rather than risking silent misrouting.

use super::DeviceId;
use crate::error::RelayError;

/// Topic path separator.
pub const TOPIC_SEPARATOR: char = '/';

/// Extracts the device identifier from a telemetry topic.
///
/// The topic must contain at least one [`TOPIC_SEPARATOR`] and its last
/// segment must be a valid [`DeviceId`]. When `required_prefix` is set, the
/// topic must additionally start with that prefix followed by a separator.
///
/// # Errors
///
/// Returns [`RelayError::InvalidMessage`] when the topic has no separator,
/// an empty last segment, an invalid device identifier, or a prefix
/// mismatch.
pub fn extract_device_id(
    topic: &str,
    required_prefix: Option<&str>,
) -> Result<DeviceId, RelayError> {
    let Some((head, last)) = topic.rsplit_once(TOPIC_SEPARATOR) else {
        return Err(RelayError::InvalidMessage(format!(
            "topic {topic:?} has no separator"
        )));
    };
    if head.is_empty() {
        return Err(RelayError::InvalidMessage(format!(
            "topic {topic:?} has an empty prefix"
        )));
    }

    if let Some(prefix) = required_prefix {
        let matches_prefix = topic
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with(TOPIC_SEPARATOR));
        if !matches_prefix {
            return Err(RelayError::InvalidMessage(format!(
                "topic {topic:?} does not match required prefix {prefix:?}"
            )));
        }
    }

    DeviceId::parse(last)
}
