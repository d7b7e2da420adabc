use soil_telemetry::{AppendReceipt, Clock, IdGenerator, TelemetryRecord};

use crate::error::DatabaseError;
use crate::repo::telemetry::{record_to_item, TelemetryStore};

/// Appends normalized records to their device's history
///
/// Every call creates a new entry with a fresh record id. Nothing is read,
/// replaced or retried here; the caller decides what a failure means.
pub struct Recorder<S> {
    store: S,
    clock: Box<dyn Clock>,
    id_generator: Box<dyn IdGenerator>,
}

impl<S: TelemetryStore> Recorder<S> {
    pub fn new(
        store: S,
        clock: impl Clock + 'static,
        id_generator: impl IdGenerator + 'static,
    ) -> Self {
        Self {
            store,
            clock: Box::new(clock),
            id_generator: Box::new(id_generator),
        }
    }

    /// Append one record under `device_id`
    pub async fn append(
        &self,
        device_id: &str,
        record: &TelemetryRecord,
    ) -> Result<AppendReceipt, DatabaseError> {
        let record_id = self.id_generator.record_id(record.timestamp);
        let committed_at = self.clock.now();

        let item = record_to_item(device_id, &record_id, record, committed_at);
        self.store.put_new_item(item).await?;

        Ok(AppendReceipt {
            record_id,
            committed_at,
        })
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }
}
