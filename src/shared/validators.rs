use chrono::{DateTime, Utc};

use crate::error::NormalizeError;

/// Maximum device id length in bytes (DynamoDB partition key limit)
pub const MAX_DEVICE_ID_LEN: usize = 2048;

/// Largest epoch milliseconds that fit the 13-digit record id prefix
pub const MAX_TIMESTAMP_MS: i64 = 9_999_999_999_999;

/// Validate a device id taken from transport metadata
/// Must be non-blank, at most 2048 bytes, and free of control characters
pub fn validate_device_id(device_id: &str) -> Result<(), NormalizeError> {
    if device_id.trim().is_empty() {
        return Err(NormalizeError::InvalidDeviceId(
            "Device id cannot be empty".to_string(),
        ));
    }

    if device_id.len() > MAX_DEVICE_ID_LEN {
        return Err(NormalizeError::InvalidDeviceId(format!(
            "Device id length {} exceeds maximum of {} bytes",
            device_id.len(),
            MAX_DEVICE_ID_LEN
        )));
    }

    if device_id.chars().any(|c| c.is_control()) {
        return Err(NormalizeError::InvalidDeviceId(
            "Device id must not contain control characters".to_string(),
        ));
    }

    Ok(())
}

/// Parse the transport delivery timestamp into a UTC instant
///
/// Instants before the Unix epoch or past year 2286 are rejected: record ids
/// start with zero-padded 13-digit epoch milliseconds and would no longer
/// sort in time order.
pub fn parse_delivery_timestamp(timestamp: &str) -> Result<DateTime<Utc>, NormalizeError> {
    let parsed = DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| {
            NormalizeError::InvalidTimestamp(format!(
                "'{}' is not RFC3339 (e.g., 2024-03-01T10:00:00Z): {}",
                timestamp, e
            ))
        })?;

    let millis = parsed.timestamp_millis();
    if !(0..=MAX_TIMESTAMP_MS).contains(&millis) {
        return Err(NormalizeError::InvalidTimestamp(format!(
            "'{}' is outside the supported range 1970-01-01 to 2286-11-20",
            timestamp
        )));
    }

    Ok(parsed)
}
