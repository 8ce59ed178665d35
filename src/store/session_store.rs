//! Persisted cumulative total and bounded history of completed sessions

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::KeyValueStore;
use crate::{error::StoreError, utils::Clock};

/// Storage key of the cumulative total in seconds
pub const TOTAL_TIME_KEY: &str = "totalTime";
/// Storage key of the newest-first record list
pub const RECORDS_KEY: &str = "records";
/// Number of sessions kept in history
pub const MAX_RECORDS: usize = 5;

/// One completed start→stop interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Display instant in epoch millis
    pub date: i64,
    /// Length of the session in seconds
    pub duration: u64,
    /// Creation instant in epoch millis, unique within the history
    pub timestamp: i64,
}

/// Total and history as read in one round trip
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub total_time: i64,
    pub records: Vec<SessionRecord>,
}

/// Session history and cumulative total on top of a key-value backend.
///
/// Each operation is one read followed by one write; two writers racing on
/// the same backend resolve as last write wins. Read failures degrade to an
/// empty history and a zero total.
#[derive(Debug)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    changes_tx: watch::Sender<StoreSnapshot>,
}

impl SessionStore {
    /// Create a store over `backend`, stamping records with `clock`
    pub fn new(backend: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let (changes_tx, _) = watch::channel(StoreSnapshot::default());
        let store = Self {
            backend,
            clock,
            changes_tx,
        };
        store.changes_tx.send_replace(store.snapshot());
        store
    }

    /// Receive a fresh snapshot after every write
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.changes_tx.subscribe()
    }

    /// Read total and records together
    pub fn snapshot(&self) -> StoreSnapshot {
        let values = self.read(&[TOTAL_TIME_KEY, RECORDS_KEY]);
        StoreSnapshot {
            total_time: total_from(&values),
            records: records_from(&values),
        }
    }

    /// Stored sessions, newest first
    pub fn records(&self) -> Vec<SessionRecord> {
        records_from(&self.read(&[RECORDS_KEY]))
    }

    /// Cumulative total in seconds, zero when unset
    pub fn get_total(&self) -> i64 {
        total_from(&self.read(&[TOTAL_TIME_KEY]))
    }

    /// Overwrite the cumulative total
    pub fn set_total(&self, seconds: i64) -> Result<(), StoreError> {
        let mut entries = Map::new();
        entries.insert(TOTAL_TIME_KEY.to_string(), Value::from(seconds));
        self.backend.set(entries)?;

        debug!("Total time set to {}s", seconds);
        self.notify();
        Ok(())
    }

    /// Prepend a record for a session of `duration` seconds and return the
    /// updated history
    pub fn add_record(&self, duration: u64) -> Result<Vec<SessionRecord>, StoreError> {
        let mut records = self.records();
        let timestamp = self.prepend_record(&mut records, duration);

        let mut entries = Map::new();
        entries.insert(RECORDS_KEY.to_string(), serde_json::to_value(&records)?);
        self.backend.set(entries)?;

        info!("Recorded session of {}s at {}", duration, timestamp);
        self.notify();
        Ok(records)
    }

    /// Record a completed session: add `duration` to the total and prepend its
    /// record in a single write, so the two never disagree
    pub fn record_session(&self, duration: u64) -> Result<StoreSnapshot, StoreError> {
        let mut snapshot = self.snapshot();
        let timestamp = self.prepend_record(&mut snapshot.records, duration);
        snapshot.total_time += duration as i64;

        self.write_snapshot(&snapshot)?;
        info!(
            "Recorded session of {}s at {}, total now {}s",
            duration, timestamp, snapshot.total_time
        );
        self.notify();
        Ok(snapshot)
    }

    fn prepend_record(&self, records: &mut Vec<SessionRecord>, duration: u64) -> i64 {
        let mut now = self.clock.now_millis();
        if let Some(newest) = records.first() {
            // timestamps identify records, keep them strictly increasing
            now = now.max(newest.timestamp + 1);
        }

        records.insert(
            0,
            SessionRecord {
                date: now,
                duration,
                timestamp: now,
            },
        );
        records.truncate(MAX_RECORDS);
        now
    }

    /// Remove the record with exactly this timestamp and take its duration off
    /// the total. Unknown timestamps leave everything untouched.
    pub fn delete_record(&self, timestamp: i64) -> Result<StoreSnapshot, StoreError> {
        let mut snapshot = self.snapshot();

        let Some(index) = snapshot.records.iter().position(|r| r.timestamp == timestamp) else {
            debug!("No record with timestamp {}, nothing deleted", timestamp);
            return Ok(snapshot);
        };

        let removed = snapshot.records.remove(index);
        snapshot.total_time -= removed.duration as i64;

        self.write_snapshot(&snapshot)?;
        info!(
            "Deleted session {} ({}s), total now {}s",
            removed.timestamp, removed.duration, snapshot.total_time
        );
        self.notify();
        Ok(snapshot)
    }

    /// Empty the history and zero the total
    pub fn clear_all(&self) -> Result<(), StoreError> {
        self.write_snapshot(&StoreSnapshot::default())?;
        info!("Cleared session history and total");
        self.notify();
        Ok(())
    }

    fn write_snapshot(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        let mut entries = Map::new();
        entries.insert(TOTAL_TIME_KEY.to_string(), Value::from(snapshot.total_time));
        entries.insert(RECORDS_KEY.to_string(), serde_json::to_value(&snapshot.records)?);
        self.backend.set(entries)
    }

    fn read(&self, keys: &[&str]) -> Map<String, Value> {
        self.backend.get(keys).unwrap_or_else(|e| {
            warn!("Failed to read {:?} from store: {}", keys, e);
            Map::new()
        })
    }

    fn notify(&self) {
        self.changes_tx.send_replace(self.snapshot());
    }
}

fn total_from(values: &Map<String, Value>) -> i64 {
    match values.get(TOTAL_TIME_KEY) {
        None | Some(Value::Null) => 0,
        Some(value) => value.as_i64().unwrap_or_else(|| {
            warn!("Stored {} is not an integer: {}", TOTAL_TIME_KEY, value);
            0
        }),
    }
}

fn records_from(values: &Map<String, Value>) -> Vec<SessionRecord> {
    match values.get(RECORDS_KEY) {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!("Stored {} are unreadable: {}", RECORDS_KEY, e);
            Vec::new()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::MemoryStore, utils::ManualClock};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Memory backend that counts writes
    #[derive(Debug, Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: AtomicUsize,
    }

    impl KeyValueStore for CountingStore {
        fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError> {
            self.inner.get(keys)
        }

        fn set(&self, entries: Map<String, Value>) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(entries)
        }
    }

    fn store() -> (SessionStore, ManualClock, Arc<MemoryStore>) {
        let clock = ManualClock::new(1_760_800_000_000);
        let backend = Arc::new(MemoryStore::new());
        let store = SessionStore::new(backend.clone(), Arc::new(clock.clone()));
        (store, clock, backend)
    }

    #[test]
    fn empty_backend_defaults() {
        let (store, _, _) = store();
        assert_eq!(store.get_total(), 0);
        assert!(store.records().is_empty());
        assert_eq!(store.snapshot(), StoreSnapshot::default());
    }

    #[test]
    fn add_record_prepends() {
        let (store, clock, _) = store();
        store.add_record(60).unwrap();
        clock.advance_secs(100);
        let records = store.add_record(40).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].duration, 40);
        assert_eq!(records[1].duration, 60);
        assert!(records[0].timestamp > records[1].timestamp);
        assert_eq!(records[0].date, records[0].timestamp);
        assert_eq!(store.records(), records);
    }

    #[test]
    fn sixth_record_evicts_oldest() {
        let (store, clock, _) = store();
        for duration in 1..=6 {
            store.add_record(duration).unwrap();
            clock.advance_secs(1);
        }

        let records = store.records();
        assert_eq!(records.len(), MAX_RECORDS);
        let durations: Vec<u64> = records.iter().map(|r| r.duration).collect();
        assert_eq!(durations, vec![6, 5, 4, 3, 2]);
        assert!(records.iter().all(|r| r.timestamp != 1_760_800_000_000));
    }

    #[test]
    fn same_instant_records_get_distinct_timestamps() {
        let (store, _, _) = store();
        store.add_record(1).unwrap();
        let records = store.add_record(2).unwrap();
        assert_eq!(records[0].timestamp, records[1].timestamp + 1);
    }

    #[test]
    fn record_session_updates_total_and_history_in_one_write() {
        let clock = ManualClock::new(1_760_800_000_000);
        let backend = Arc::new(CountingStore::default());
        let store = SessionStore::new(backend.clone(), Arc::new(clock.clone()));
        store.set_total(10).unwrap();
        let writes_before = backend.writes.load(Ordering::SeqCst);

        let snapshot = store.record_session(125).unwrap();

        assert_eq!(backend.writes.load(Ordering::SeqCst), writes_before + 1);
        assert_eq!(snapshot.total_time, 135);
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.records[0].duration, 125);
        assert_eq!(store.snapshot(), snapshot);
    }

    #[test]
    fn record_session_caps_history_but_keeps_counting() {
        let (store, clock, _) = store();
        for duration in 1..=6 {
            store.record_session(duration).unwrap();
            clock.advance_secs(1);
        }

        let snapshot = store.snapshot();
        assert_eq!(snapshot.total_time, 21);
        assert_eq!(snapshot.records.len(), MAX_RECORDS);
        assert_eq!(snapshot.records[0].duration, 6);
    }

    #[test]
    fn delete_adjusts_total() {
        let (store, clock, _) = store();
        store.set_total(100).unwrap();
        store.add_record(60).unwrap();
        clock.advance_secs(1);
        let records = store.add_record(40).unwrap();

        let snapshot = store.delete_record(records[1].timestamp).unwrap();
        assert_eq!(snapshot.total_time, 40);
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.records[0].duration, 40);
        assert_eq!(store.snapshot(), snapshot);
    }

    #[test]
    fn delete_unknown_timestamp_changes_nothing() {
        let (store, _, _) = store();
        store.set_total(60).unwrap();
        store.add_record(60).unwrap();
        let before = store.snapshot();

        let after = store.delete_record(42).unwrap();
        assert_eq!(after, before);
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn clear_all_empties_everything() {
        let (store, _, _) = store();
        store.set_total(500).unwrap();
        store.add_record(500).unwrap();

        store.clear_all().unwrap();
        assert_eq!(store.snapshot(), StoreSnapshot::default());
    }

    #[test]
    fn garbage_values_read_as_defaults() {
        let (store, _, backend) = store();
        let mut entries = Map::new();
        entries.insert(TOTAL_TIME_KEY.to_string(), json!("lots"));
        entries.insert(RECORDS_KEY.to_string(), json!({ "not": "a list" }));
        backend.set(entries).unwrap();

        assert_eq!(store.get_total(), 0);
        assert!(store.records().is_empty());
    }

    #[test]
    fn records_use_storage_field_names() {
        let (store, _, backend) = store();
        store.add_record(7).unwrap();

        let raw = backend.get(&[RECORDS_KEY]).unwrap();
        assert_eq!(
            raw[RECORDS_KEY],
            json!([{ "date": 1_760_800_000_000i64, "duration": 7, "timestamp": 1_760_800_000_000i64 }])
        );
    }

    #[test]
    fn writes_notify_subscribers() {
        let (store, _, _) = store();
        let mut rx = store.subscribe();

        store.add_record(5).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().records.len(), 1);

        store.set_total(5).unwrap();
        assert_eq!(rx.borrow().total_time, 5);
    }
}
