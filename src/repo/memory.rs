//! In-process telemetry stores for unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::DatabaseError;
use crate::repo::telemetry::{Item, TelemetryStore};

/// Keeps items in memory and enforces the same key uniqueness as the table
#[derive(Debug, Default)]
pub struct MemoryTelemetryStore {
    items: Mutex<Vec<Item>>,
}

impl MemoryTelemetryStore {
    pub fn items(&self) -> Vec<Item> {
        self.items.lock().unwrap().clone()
    }

    pub fn items_for_device(&self, device_id: &str) -> Vec<Item> {
        self.items()
            .into_iter()
            .filter(|item| item["device_id"].as_s().map(String::as_str) == Ok(device_id))
            .collect()
    }
}

fn key_of(item: &Item) -> (Option<String>, Option<String>) {
    (
        item.get("device_id").and_then(|v| v.as_s().ok()).cloned(),
        item.get("record_id").and_then(|v| v.as_s().ok()).cloned(),
    )
}

impl TelemetryStore for MemoryTelemetryStore {
    async fn put_new_item(&self, item: Item) -> Result<(), DatabaseError> {
        let mut items = self.items.lock().unwrap();
        let key = key_of(&item);
        if items.iter().any(|existing| key_of(existing) == key) {
            return Err(DatabaseError::ConditionalCheckFailed);
        }
        items.push(item);
        Ok(())
    }
}

/// Rejects every write, counting the attempts
#[derive(Debug, Default)]
pub struct FailingTelemetryStore {
    attempts: AtomicUsize,
}

impl FailingTelemetryStore {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl TelemetryStore for FailingTelemetryStore {
    async fn put_new_item(&self, _item: Item) -> Result<(), DatabaseError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DatabaseError::DynamoDb(
            "ProvisionedThroughputExceededException".to_string(),
        ))
    }
}
