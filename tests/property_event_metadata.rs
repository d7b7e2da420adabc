//! Property Test: Transport Metadata Validation
//!
//! This property test verifies that:
//! - Valid device ids and RFC3339 delivery timestamps are accepted
//! - Blank, oversized or control-character device ids are rejected
//! - Delivery timestamps that are not RFC3339 are rejected

use proptest::prelude::*;
use serde_json::json;
use soil_telemetry::test_utils::generators;
use soil_telemetry::validators::{parse_delivery_timestamp, validate_device_id};
use soil_telemetry::{normalize, NormalizeError};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: All generated valid device ids should pass validation
    #[test]
    fn prop_valid_device_ids_accepted(device_id in generators::device_id()) {
        let result = validate_device_id(&device_id);
        prop_assert!(
            result.is_ok(),
            "Valid device id {} should be accepted, but got error: {:?}",
            device_id,
            result.err()
        );
    }

    /// Property: All generated invalid device ids should fail normalization
    #[test]
    fn prop_invalid_device_ids_rejected(device_id in generators::invalid_device_id()) {
        let result = normalize(&json!({"soil_humidity": 30.0}), &device_id, "2024-03-01T10:00:00Z");
        prop_assert!(
            matches!(result, Err(NormalizeError::InvalidDeviceId(_))),
            "Invalid device id {:?} should be rejected, got {:?}",
            device_id,
            result
        );
    }

    /// Property: All generated delivery timestamps parse
    #[test]
    fn prop_valid_delivery_timestamps_accepted(ts in generators::delivery_timestamp()) {
        prop_assert!(parse_delivery_timestamp(&ts).is_ok());
    }

    /// Property: Non-RFC3339 delivery timestamps are rejected
    #[test]
    fn prop_invalid_delivery_timestamps_rejected(ts in generators::invalid_delivery_timestamp()) {
        let result = normalize(&json!({"soil_humidity": 30.0}), "esp32-garden-01", &ts);
        prop_assert!(
            matches!(result, Err(NormalizeError::InvalidTimestamp(_))),
            "Invalid timestamp {:?} should be rejected, got {:?}",
            ts,
            result
        );
    }
}

#[cfg(test)]
mod additional_tests {
    use super::*;

    #[test]
    fn test_distinct_delivery_times_give_distinct_records() {
        let payload = json!({"soil_humidity": 30.0});
        let first = normalize(&payload, "esp32-garden-01", "2024-03-01T10:00:00Z").unwrap();
        let second = normalize(&payload, "esp32-garden-01", "2024-03-01T10:05:00Z").unwrap();

        assert_ne!(first, second);
        assert_eq!((second.timestamp - first.timestamp).num_seconds(), 300);
    }
}
