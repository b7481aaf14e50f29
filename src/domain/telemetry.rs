//! Ingress telemetry message envelope.
//!
//! A [`TelemetryMessage`] wraps the raw JSON document published by a device.
//! The only field this service interprets is `mqttTopic`; everything else is
//! opaque payload carried verbatim to subscribers.

use serde_json::Value;

use super::{DeviceId, topic};
use crate::error::RelayError;

/// JSON key carrying the publish topic in ingress documents.
pub const TOPIC_FIELD: &str = "mqttTopic";

/// One inbound telemetry message, immutable once constructed.
///
/// The originating [`DeviceId`] is resolved eagerly from the topic so the
/// fan-out path never re-parses and a malformed message is rejected before
/// any delivery is attempted.
#[derive(Debug, Clone)]
pub struct TelemetryMessage {
    device_id: DeviceId,
    topic: String,
    payload: Value,
}

impl TelemetryMessage {
    /// Builds a message from a raw ingress JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidMessage`] when `mqttTopic` is missing,
    /// not a string, or fails topic validation (see
    /// [`topic::extract_device_id`]).
    pub fn from_value(raw: Value, required_prefix: Option<&str>) -> Result<Self, RelayError> {
        let Some(topic_str) = raw.get(TOPIC_FIELD).and_then(Value::as_str) else {
            return Err(RelayError::InvalidMessage(format!(
                "missing or non-string {TOPIC_FIELD} field"
            )));
        };
        let device_id = topic::extract_device_id(topic_str, required_prefix)?;
        Ok(Self {
            device_id,
            topic: topic_str.to_string(),
            payload: raw,
        })
    }

    /// The device that originated this message.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// The full publish topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Serializes the full ingress document as the text delivered to
    /// subscribers, verbatim.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.payload.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_topic_and_device_id() {
        let raw = json!({
            "mqttTopic": "smaket/iot/data/RFID-Device-01",
            "temperature": 24.5,
            "humidity": 48.0,
        });
        let Ok(msg) = TelemetryMessage::from_value(raw, None) else {
            panic!("valid message");
        };
        assert_eq!(msg.device_id().as_str(), "RFID-Device-01");
        assert_eq!(msg.topic(), "smaket/iot/data/RFID-Device-01");
    }

    #[test]
    fn delivered_text_is_full_document() {
        let raw = json!({
            "mqttTopic": "smaket/iot/data/dev1",
            "temperature": 24.5,
        });
        let Ok(msg) = TelemetryMessage::from_value(raw.clone(), None) else {
            panic!("valid message");
        };
        let Ok(round_trip) = serde_json::from_str::<Value>(&msg.to_text()) else {
            panic!("delivered text is JSON");
        };
        assert_eq!(round_trip, raw);
    }

    #[test]
    fn missing_topic_field_is_invalid() {
        let raw = json!({"temperature": 24.5});
        let err = TelemetryMessage::from_value(raw, None);
        assert!(matches!(err, Err(RelayError::InvalidMessage(_))));
    }

    #[test]
    fn non_string_topic_is_invalid() {
        let raw = json!({"mqttTopic": 42});
        assert!(TelemetryMessage::from_value(raw, None).is_err());
    }

    #[test]
    fn topic_without_separator_is_invalid() {
        let raw = json!({"mqttTopic": "RFID-Device-01"});
        assert!(TelemetryMessage::from_value(raw, None).is_err());
    }

    #[test]
    fn enforces_required_prefix() {
        let raw = json!({"mqttTopic": "other/data/dev1"});
        let err = TelemetryMessage::from_value(raw, Some("smaket/iot/data"));
        assert!(matches!(err, Err(RelayError::InvalidMessage(_))));
    }
}
