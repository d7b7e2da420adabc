use aws_lambda_events::event::sns::SnsRecord;
use chrono::SecondsFormat;
use tracing::{error, info, warn};

use soil_telemetry::{normalize, range_advisories, AppendReceipt, RawEvent};

use crate::error::IngestError;
use crate::recorder::Recorder;
use crate::repo::telemetry::TelemetryStore;
use crate::transport;

/// Run one SNS delivery through normalize → record
///
/// The returned result is what the transport gets acknowledged with; an
/// error here must end the invocation as failed so the message is retried.
pub async fn process_sns_record<S: TelemetryStore>(
    record: &SnsRecord,
    recorder: &Recorder<S>,
) -> Result<AppendReceipt, IngestError> {
    match transport::raw_event_from_sns(record) {
        Ok(event) => process_event(&event, recorder).await,
        Err(e) => {
            let err = IngestError::from(e);
            log_failure(&transport::device_id(record), Some(&record.sns.message_id), &err);
            Err(err)
        }
    }
}

/// Normalize a raw event and append the result under its device
pub async fn process_event<S: TelemetryStore>(
    event: &RawEvent,
    recorder: &Recorder<S>,
) -> Result<AppendReceipt, IngestError> {
    let message_id = event.message_id.as_deref();

    // Normalization is pure; nothing is written when it fails
    let record = match normalize(&event.payload, &event.device_id, &event.delivery_timestamp) {
        Ok(record) => record,
        Err(e) => {
            let err = IngestError::from(e);
            log_failure(&event.device_id, message_id, &err);
            return Err(err);
        }
    };

    info!(
        device_id = %event.device_id,
        soil_humidity = record.soil_humidity,
        timestamp = %record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        "Telemetry event normalized"
    );

    for advisory in range_advisories(&record) {
        warn!(
            device_id = %event.device_id,
            field = advisory.field,
            value = advisory.value,
            min = advisory.min,
            max = advisory.max,
            "Sensor value outside expected range, storing unchanged"
        );
    }

    match recorder.append(&event.device_id, &record).await {
        Ok(receipt) => {
            info!(
                device_id = %event.device_id,
                record_id = %receipt.record_id,
                committed_at = %receipt.committed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                "Telemetry record appended"
            );
            Ok(receipt)
        }
        Err(e) => {
            let err = IngestError::from(e);
            log_failure(&event.device_id, message_id, &err);
            Err(err)
        }
    }
}

fn log_failure(device_id: &str, message_id: Option<&str>, err: &IngestError) {
    error!(
        device_id = %device_id,
        message_id = message_id.unwrap_or("-"),
        stage = err.stage(),
        error_code = err.error_code(),
        error = %err,
        "Telemetry event failed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::memory::{FailingTelemetryStore, MemoryTelemetryStore};
    use crate::transport::test_support::sns_record;
    use serde_json::json;
    use soil_telemetry::{FixedClock, NormalizeError, RandomIdGenerator};

    fn memory_recorder() -> Recorder<MemoryTelemetryStore> {
        Recorder::new(
            MemoryTelemetryStore::default(),
            FixedClock::from_rfc3339("2024-03-01T10:00:02Z").unwrap(),
            RandomIdGenerator::new(),
        )
    }

    fn failing_recorder() -> Recorder<FailingTelemetryStore> {
        Recorder::new(
            FailingTelemetryStore::default(),
            FixedClock::from_rfc3339("2024-03-01T10:00:02Z").unwrap(),
            RandomIdGenerator::new(),
        )
    }

    fn raw_event(payload: serde_json::Value, delivered_at: &str) -> RawEvent {
        RawEvent {
            device_id: "esp32-garden-01".to_string(),
            payload,
            delivery_timestamp: delivered_at.to_string(),
            message_id: None,
        }
    }

    #[tokio::test]
    async fn test_event_is_normalized_and_stored() {
        let recorder = memory_recorder();
        let event = raw_event(
            json!({"soil_humidity": 50, "temp": 21.6, "humidity": 44.5}),
            "2024-03-01T10:00:00Z",
        );

        process_event(&event, &recorder).await.unwrap();

        let items = recorder.store().items_for_device("esp32-garden-01");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["soil_humidity"].as_n().unwrap(), "50");
        assert_eq!(items[0]["temp"].as_n().unwrap(), "22");
        assert_eq!(items[0]["humidity"].as_n().unwrap(), "45");
        assert_eq!(items[0]["timestamp_ms"].as_n().unwrap(), "1709287200000");
    }

    #[tokio::test]
    async fn test_missing_soil_humidity_skips_storage() {
        let recorder = memory_recorder();
        let event = raw_event(json!({"temp": 20.0}), "2024-03-01T10:00:00Z");

        let result = process_event(&event, &recorder).await;

        assert!(matches!(
            result,
            Err(IngestError::Normalize(NormalizeError::MalformedPayload { .. }))
        ));
        assert!(recorder.store().items().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_payload_never_reaches_store() {
        let recorder = failing_recorder();
        let event = raw_event(json!({"soil_humidity": "wet"}), "2024-03-01T10:00:00Z");

        let result = process_event(&event, &recorder).await;

        assert_eq!(result.unwrap_err().error_code(), "MALFORMED_PAYLOAD");
        assert_eq!(recorder.store().attempts(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_reported_as_write_failed() {
        let recorder = failing_recorder();
        let event = raw_event(json!({"soil_humidity": 12.34}), "2024-03-01T10:00:00Z");

        let err = process_event(&event, &recorder).await.unwrap_err();

        assert!(matches!(err, IngestError::WriteFailed(_)));
        assert_eq!(err.error_code(), "WRITE_FAILED");
        assert_eq!(recorder.store().attempts(), 1);
    }

    #[tokio::test]
    async fn test_redelivery_is_not_deduplicated() {
        let recorder = memory_recorder();
        let first = raw_event(json!({"soil_humidity": 33.3}), "2024-03-01T10:00:00Z");
        let second = raw_event(json!({"soil_humidity": 33.3}), "2024-03-01T10:05:00Z");

        let a = process_event(&first, &recorder).await.unwrap();
        let b = process_event(&second, &recorder).await.unwrap();

        assert_ne!(a.record_id, b.record_id);
        assert_eq!(recorder.store().items_for_device("esp32-garden-01").len(), 2);
    }

    #[tokio::test]
    async fn test_unexpected_attempt_type_still_stored() {
        let recorder = memory_recorder();
        let event = raw_event(json!({"soil_humidity": 42, "attempt": "2"}), "2024-03-01T10:00:00Z");

        process_event(&event, &recorder).await.unwrap();

        let items = recorder.store().items();
        assert_eq!(items[0]["soil_humidity"].as_n().unwrap(), "42");
        assert_eq!(items[0]["attempt"].as_s().unwrap(), "2");
    }

    #[tokio::test]
    async fn test_unstorable_number_is_malformed_not_write_failure() {
        let recorder = failing_recorder();
        let event = raw_event(json!({"soil_humidity": 1e200}), "2024-03-01T10:00:00Z");

        let err = process_event(&event, &recorder).await.unwrap_err();

        assert_eq!(err.error_code(), "MALFORMED_PAYLOAD");
        assert_eq!(recorder.store().attempts(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_value_still_stored() {
        let recorder = memory_recorder();
        let event = raw_event(json!({"soil_humidity": 104.2}), "2024-03-01T10:00:00Z");

        process_event(&event, &recorder).await.unwrap();

        assert_eq!(recorder.store().items().len(), 1);
    }

    #[tokio::test]
    async fn test_sns_record_end_to_end() {
        let recorder = memory_recorder();
        let record = sns_record(
            r#"{"soil_humidity": 12.34, "watered_flag": true}"#,
            Some("esp32-garden-01"),
            "2024-03-01T10:00:00Z",
        );

        let receipt = process_sns_record(&record, &recorder).await.unwrap();

        assert!(receipt.record_id.starts_with("1709287200000#"));
        let items = recorder.store().items();
        assert_eq!(items[0]["soil_humidity"].as_n().unwrap(), "12.3");
        assert_eq!(items[0]["watered_flag"].as_bool().unwrap(), &true);
    }

    #[tokio::test]
    async fn test_sns_record_without_device_id_rejected() {
        let recorder = memory_recorder();
        let record = sns_record(r#"{"soil_humidity": 12.34}"#, None, "2024-03-01T10:00:00Z");

        let err = process_sns_record(&record, &recorder).await.unwrap_err();

        assert_eq!(err.error_code(), "INVALID_DEVICE_ID");
        assert!(recorder.store().items().is_empty());
    }

    #[tokio::test]
    async fn test_sns_record_with_non_json_body_rejected() {
        let recorder = memory_recorder();
        let record = sns_record("not json", Some("esp32-garden-01"), "2024-03-01T10:00:00Z");

        let err = process_sns_record(&record, &recorder).await.unwrap_err();

        assert_eq!(err.stage(), "normalize");
        assert_eq!(err.error_code(), "MALFORMED_PAYLOAD");
    }
}
