use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;
use std::future::Future;

use serde_json::Value;
use soil_telemetry::TelemetryRecord;

use crate::error::DatabaseError;

/// DynamoDB item as sent to `PutItem`
pub type Item = HashMap<String, AttributeValue>;

/// Append-only storage for device telemetry
pub trait TelemetryStore: Send + Sync {
    /// Write a new item. Fails instead of replacing an item with the same key.
    fn put_new_item(&self, item: Item) -> impl Future<Output = Result<(), DatabaseError>> + Send;
}

/// Telemetry table keyed by `device_id` (partition) and `record_id` (sort)
#[derive(Debug, Clone)]
pub struct DynamoDbTelemetryStore {
    client: DynamoDbClient,
    table_name: String,
}

impl DynamoDbTelemetryStore {
    pub fn new(client: DynamoDbClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

impl TelemetryStore for DynamoDbTelemetryStore {
    async fn put_new_item(&self, item: Item) -> Result<(), DatabaseError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(record_id)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_conditional_check_failed(&err) => {
                Err(DatabaseError::ConditionalCheckFailed)
            }
            Err(err) => Err(DatabaseError::from(err)),
        }
    }
}

/// Convert a telemetry record into a DynamoDB item under its device
///
/// Absent optional fields produce no attribute at all.
pub fn record_to_item(
    device_id: &str,
    record_id: &str,
    record: &TelemetryRecord,
    committed_at: DateTime<Utc>,
) -> Item {
    let mut item = HashMap::new();

    item.insert(
        "device_id".to_string(),
        AttributeValue::S(device_id.to_string()),
    );
    item.insert(
        "record_id".to_string(),
        AttributeValue::S(record_id.to_string()),
    );
    item.insert(
        "timestamp_ms".to_string(),
        AttributeValue::N(record.timestamp.timestamp_millis().to_string()),
    );
    item.insert(
        "soil_humidity".to_string(),
        AttributeValue::N(record.soil_humidity.to_string()),
    );
    item.insert(
        "committed_at".to_string(),
        AttributeValue::S(committed_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );

    if let Some(temp) = record.temp {
        item.insert("temp".to_string(), AttributeValue::N(temp.to_string()));
    }
    if let Some(humidity) = record.humidity {
        item.insert(
            "humidity".to_string(),
            AttributeValue::N(humidity.to_string()),
        );
    }
    let pass_through = [
        ("watered_flag", &record.watered_flag),
        ("error", &record.error),
        ("success", &record.success),
        ("attempt", &record.attempt),
    ];
    for (name, value) in pass_through {
        if let Some(value) = value {
            item.insert(name.to_string(), json_to_attribute(value));
        }
    }

    item
}

/// Map a device-supplied JSON value onto the matching DynamoDB type
fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(flag) => AttributeValue::Bool(*flag),
        Value::Number(number) => AttributeValue::N(number.to_string()),
        Value::String(text) => AttributeValue::S(text.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(json_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(key, item)| (key.clone(), json_to_attribute(item)))
                .collect(),
        ),
    }
}

/// Check if a PutItem failed on its `attribute_not_exists` condition
fn is_conditional_check_failed(
    err: &aws_sdk_dynamodb::error::SdkError<aws_sdk_dynamodb::operation::put_item::PutItemError>,
) -> bool {
    use aws_sdk_dynamodb::error::SdkError;
    use aws_sdk_dynamodb::operation::put_item::PutItemError;

    match err {
        SdkError::ServiceError(service_err) => {
            matches!(
                service_err.err(),
                PutItemError::ConditionalCheckFailedException(_)
            )
        }
        _ => false,
    }
}
