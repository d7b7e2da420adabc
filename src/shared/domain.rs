use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Telemetry event as handed over by the transport, before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    /// Device identifier taken from the message attributes, not the body
    pub device_id: String,
    /// Decoded message body; expected to be a JSON object
    pub payload: Value,
    /// Delivery time assigned by the transport (RFC 3339 / ISO-8601)
    pub delivery_timestamp: String,
    /// Transport message identifier, used for log correlation only
    pub message_id: Option<String>,
}

/// Canonical sensor reading as persisted under a device
///
/// Optional fields are `None` when the device did not report them and are
/// never serialized in that case. `watered_flag`, `error`, `success` and
/// `attempt` hold whatever JSON value the device sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub timestamp: DateTime<Utc>,
    pub soil_humidity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watered_flag: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt: Option<Value>,
}

/// Outcome of a successful append
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendReceipt {
    /// Storage-unique identifier of the new record within its device
    pub record_id: String,
    /// Time the write was committed
    pub committed_at: DateTime<Utc>,
}
