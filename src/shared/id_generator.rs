use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// Source of unique suffixes for telemetry record ids
pub trait IdGenerator: Send + Sync {
    /// Return a fresh unique token (UUID v4 in production)
    fn unique_suffix(&self) -> String;

    /// Build a record id that sorts by delivery time within a device:
    /// `{timestamp_ms:013}#{suffix}`
    fn record_id(&self, timestamp: DateTime<Utc>) -> String {
        format_record_id(timestamp.timestamp_millis(), &self.unique_suffix())
    }
}

/// Zero-pad epoch milliseconds so lexical order equals time order
///
/// Holds for `0..=9_999_999_999_999`; delivery timestamps outside that range
/// are rejected before an id is built.
pub fn format_record_id(timestamp_ms: i64, suffix: &str) -> String {
    format!("{:013}#{}", timestamp_ms, suffix)
}

/// Production implementation backed by random UUIDs
#[derive(Debug, Clone, Default)]
pub struct RandomIdGenerator;

impl RandomIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for RandomIdGenerator {
    fn unique_suffix(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic generator for tests: cycles through the given suffixes
#[derive(Debug)]
pub struct FixedIdGenerator {
    suffixes: Vec<String>,
    next: AtomicUsize,
}

impl FixedIdGenerator {
    pub fn new(suffixes: Vec<String>) -> Self {
        assert!(!suffixes.is_empty(), "FixedIdGenerator needs at least one suffix");
        Self {
            suffixes,
            next: AtomicUsize::new(0),
        }
    }

    pub fn from_strings(suffixes: &[&str]) -> Self {
        Self::new(suffixes.iter().map(|s| s.to_string()).collect())
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> usize {
        self.next.load(Ordering::SeqCst)
    }
}

impl IdGenerator for FixedIdGenerator {
    fn unique_suffix(&self) -> String {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        self.suffixes[index % self.suffixes.len()].clone()
    }
}
