use aws_lambda_events::event::sns::SnsRecord;
use chrono::SecondsFormat;

use soil_telemetry::{parse_payload, NormalizeError, RawEvent};

/// Message attribute carrying the publishing device's id
pub const DEVICE_ID_ATTRIBUTE: &str = "deviceId";

/// Device id from the message attributes, empty when the publisher omitted it
pub fn device_id(record: &SnsRecord) -> String {
    record
        .sns
        .message_attributes
        .get(DEVICE_ID_ATTRIBUTE)
        .map(|attribute| attribute.value.clone())
        .unwrap_or_default()
}

/// Turn an SNS delivery into a raw event
///
/// The delivery timestamp is SNS's publish time, not anything the device
/// put in the body. Only a body that is not JSON fails here; every other
/// check belongs to the normalizer.
pub fn raw_event_from_sns(record: &SnsRecord) -> Result<RawEvent, NormalizeError> {
    let payload = parse_payload(&record.sns.message)?;

    Ok(RawEvent {
        device_id: device_id(record),
        payload,
        delivery_timestamp: record
            .sns
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        message_id: Some(record.sns.message_id.clone()),
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::sns_record;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_event_from_sns() {
        let record = sns_record(
            r#"{"soil_humidity": 12.34, "temp": 21.6}"#,
            Some("esp32-garden-01"),
            "2024-03-01T10:00:00.000Z",
        );

        let event = raw_event_from_sns(&record).unwrap();

        assert_eq!(event.device_id, "esp32-garden-01");
        assert_eq!(event.payload, json!({"soil_humidity": 12.34, "temp": 21.6}));
        assert_eq!(event.delivery_timestamp, "2024-03-01T10:00:00.000Z");
        assert_eq!(
            event.message_id.as_deref(),
            Some("95df01b4-ee98-5cb9-9903-4c221d41eb5e")
        );
    }

    #[test]
    fn test_missing_device_attribute_yields_empty_id() {
        let record = sns_record(r#"{"soil_humidity": 1}"#, None, "2024-03-01T10:00:00Z");

        assert_eq!(device_id(&record), "");
        assert_eq!(raw_event_from_sns(&record).unwrap().device_id, "");
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        let record = sns_record("soil=12", Some("esp32-garden-01"), "2024-03-01T10:00:00Z");

        assert!(matches!(
            raw_event_from_sns(&record),
            Err(NormalizeError::MalformedPayload { .. })
        ));
    }
}
