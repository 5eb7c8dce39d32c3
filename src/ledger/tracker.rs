use std::num::NonZeroUsize;

use tracing::{debug, info, warn};

use super::error::Result;
use super::event::{Event, EventKind, SubjectId, Timestamp};
use super::history::Snapshot;
use super::store::SnapshotStore;

/// In-memory activity ledger backed by a [`SnapshotStore`].
///
/// `record` takes `&mut self`, so a single instance has exactly one writer.
/// Concurrent callers go through [`SharedLedger`](super::SharedLedger).
///
/// Every `record` rewrites the whole snapshot. That keeps crash recovery
/// trivial, and it is also the throughput ceiling: fine for low-volume
/// activity logging, not for high-frequency event streams.
pub struct Ledger {
    store: Box<dyn SnapshotStore>,
    state: Snapshot,
    capacity: NonZeroUsize,
}

impl Ledger {
    /// Load the persisted snapshot and build the ledger from it.
    ///
    /// A stored history longer than `capacity` is trimmed to its newest
    /// entries; the last-seen index is kept whole.
    pub fn open(store: Box<dyn SnapshotStore>, capacity: NonZeroUsize) -> Result<Self> {
        let state = store.load()?;
        let mut ledger = Self {
            store,
            state,
            capacity,
        };

        let trimmed = ledger.state.history.truncate_front(capacity);
        if trimmed > 0 {
            info!(trimmed, capacity = capacity.get(), "Trimmed stored history to capacity");
        }

        info!(
            location = %ledger.store.location(),
            events = ledger.state.history.len(),
            subjects = ledger.state.last_seen.len(),
            "Ledger opened"
        );
        Ok(ledger)
    }

    /// Replace whatever the store holds with `snapshot` and persist it.
    pub fn import(
        store: Box<dyn SnapshotStore>,
        mut snapshot: Snapshot,
        capacity: NonZeroUsize,
    ) -> Result<Self> {
        snapshot.history.truncate_front(capacity);
        let ledger = Self {
            store,
            state: snapshot,
            capacity,
        };
        ledger.persist()?;
        info!(
            location = %ledger.store.location(),
            events = ledger.state.history.len(),
            subjects = ledger.state.last_seen.len(),
            "Snapshot imported"
        );
        Ok(ledger)
    }

    /// Record one activity and persist the full snapshot.
    ///
    /// The last-seen entry is overwritten even when `timestamp` is older than
    /// the stored one. If persisting fails the event stays recorded in memory
    /// and the error is returned so the caller knows it is not durable.
    pub fn record(
        &mut self,
        subject_id: impl Into<SubjectId>,
        kind: impl Into<EventKind>,
        timestamp: Timestamp,
    ) -> Result<()> {
        self.record_event(Event::new(subject_id, kind, timestamp))
    }

    pub fn record_event(&mut self, event: Event) -> Result<()> {
        debug!(
            subject = %event.subject_id,
            kind = %event.kind,
            at = %event.timestamp,
            "Recording event"
        );

        self.state
            .last_seen
            .insert(event.subject_id.clone(), event.timestamp);
        if let Some(evicted) = self.state.history.push_bounded(event, self.capacity) {
            debug!(subject = %evicted.subject_id, "Evicted oldest event");
        }

        self.persist().inspect_err(|e| {
            warn!(
                location = %self.store.location(),
                error = %e,
                "Failed to persist ledger snapshot"
            );
        })
    }

    /// Timestamp of the subject's most recent recorded event.
    pub fn last_seen(&self, subject_id: &SubjectId) -> Option<Timestamp> {
        self.state.last_seen.get(subject_id).copied()
    }

    /// The newest `min(limit, len)` events, oldest first, as an owned copy.
    pub fn recent_events(&self, limit: usize) -> Vec<Event> {
        self.state.history.recent(limit)
    }

    /// Write the current state to the store.
    pub fn persist(&self) -> Result<()> {
        self.store.save(&self.state)
    }

    /// Owned copy of the full state.
    pub fn snapshot(&self) -> Snapshot {
        self.state.clone()
    }

    pub fn len(&self) -> usize {
        self.state.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.history.is_empty()
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    pub fn subject_count(&self) -> usize {
        self.state.last_seen.len()
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("location", &self.store.location())
            .field("events", &self.state.history.len())
            .field("subjects", &self.state.last_seen.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::error::LedgerError;
    use crate::ledger::store::MemoryStore;
    use std::sync::Arc;
    use time::Duration;

    fn cap(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn t(seconds: i64) -> Timestamp {
        Timestamp::from_unix(1_750_000_000 + seconds).unwrap()
    }

    fn open_with(store: &Arc<MemoryStore>, capacity: usize) -> Ledger {
        Ledger::open(Box::new(store.clone()), cap(capacity)).unwrap()
    }

    #[test]
    fn test_record_updates_history_and_index() {
        let store = Arc::new(MemoryStore::new());
        let mut ledger = open_with(&store, 10);

        ledger.record("1", EventKind::Message, t(0)).unwrap();

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.last_seen(&"1".into()), Some(t(0)));
        assert_eq!(ledger.recent_events(5), vec![Event::new("1", "message", t(0))]);
    }

    #[test]
    fn test_capacity_keeps_most_recent_in_order() {
        let store = Arc::new(MemoryStore::new());
        let mut ledger = open_with(&store, 3);

        for i in 0..7 {
            ledger.record(i.to_string(), "message", t(i)).unwrap();
            assert!(ledger.len() <= 3);
        }

        let ids: Vec<String> = ledger
            .recent_events(10)
            .into_iter()
            .map(|e| e.subject_id.to_string())
            .collect();
        assert_eq!(ids, vec!["4", "5", "6"]);
    }

    #[test]
    fn test_last_seen_is_last_write_wins() {
        let store = Arc::new(MemoryStore::new());
        let mut ledger = open_with(&store, 10);

        ledger.record("1", "message", t(100)).unwrap();
        ledger.record("1", "reaction", t(50)).unwrap();

        assert_eq!(ledger.last_seen(&"1".into()), Some(t(50)));
    }

    #[test]
    fn test_last_seen_survives_eviction() {
        let store = Arc::new(MemoryStore::new());
        let mut ledger = open_with(&store, 2);

        ledger.record("quiet", "vocal", t(0)).unwrap();
        for i in 1..=5 {
            ledger.record("busy", "message", t(i)).unwrap();
        }

        assert!(ledger.recent_events(10).iter().all(|e| e.subject_id.as_str() == "busy"));
        assert_eq!(ledger.last_seen(&"quiet".into()), Some(t(0)));
        assert_eq!(ledger.subject_count(), 2);
    }

    #[test]
    fn test_last_seen_unknown_subject() {
        let store = Arc::new(MemoryStore::new());
        let ledger = open_with(&store, 10);
        assert_eq!(ledger.last_seen(&"nobody".into()), None);
    }

    #[test]
    fn test_recent_events_zero_limit_is_empty() {
        let store = Arc::new(MemoryStore::new());
        let mut ledger = open_with(&store, 10);
        ledger.record("1", "message", t(0)).unwrap();

        assert!(ledger.recent_events(0).is_empty());
    }

    #[test]
    fn test_recent_events_is_a_copy() {
        let store = Arc::new(MemoryStore::new());
        let mut ledger = open_with(&store, 10);
        ledger.record("1", "message", t(0)).unwrap();

        let before = ledger.recent_events(10);
        ledger.record("2", "message", t(1)).unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(ledger.recent_events(10).len(), 2);
    }

    #[test]
    fn test_unknown_kind_recorded_as_other() {
        let store = Arc::new(MemoryStore::new());
        let mut ledger = open_with(&store, 10);
        ledger.record("1", "poll_vote", t(0)).unwrap();

        assert_eq!(ledger.recent_events(1)[0].kind, EventKind::Other);
    }

    #[test]
    fn test_every_record_is_persisted() {
        let store = Arc::new(MemoryStore::new());
        let mut ledger = open_with(&store, 10);
        ledger.record("1", "message", t(0)).unwrap();
        ledger.record("2", "reaction", t(1)).unwrap();

        let reopened = open_with(&store, 10);
        assert_eq!(reopened.snapshot(), ledger.snapshot());
    }

    #[test]
    fn test_persist_failure_keeps_memory_state() {
        let store = Arc::new(MemoryStore::new());
        let mut ledger = open_with(&store, 10);
        ledger.record("1", "message", t(0)).unwrap();

        store.fail_saves(true);
        let err = ledger.record("2", "message", t(1)).unwrap_err();
        assert!(matches!(err, LedgerError::Io(_)));

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.last_seen(&"2".into()), Some(t(1)));
        // The store still holds the last durable state.
        assert_eq!(open_with(&store, 10).len(), 1);
    }

    #[test]
    fn test_open_trims_oversized_history() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut ledger = open_with(&store, 10);
            for i in 0..6 {
                ledger.record(i.to_string(), "message", t(i)).unwrap();
            }
        }

        let ledger = open_with(&store, 4);
        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger.recent_events(1)[0].timestamp, t(5));
        assert_eq!(ledger.subject_count(), 6);
    }

    #[test]
    fn test_open_corrupt_store_fails() {
        let store = MemoryStore::with_bytes("not json at all");
        let err = Ledger::open(Box::new(store), cap(10)).unwrap_err();
        assert!(err.is_corrupt_data());
    }

    #[test]
    fn test_import_replaces_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut snapshot = Snapshot::default();
        snapshot.history = (0..5)
            .map(|i| Event::new(i.to_string(), "message", t(i)))
            .collect();
        snapshot.last_seen.insert("0".into(), t(0) - Duration::days(1));

        let ledger = Ledger::import(Box::new(store.clone()), snapshot, cap(3)).unwrap();
        assert_eq!(ledger.len(), 3);

        let reopened = open_with(&store, 3);
        assert_eq!(reopened.snapshot(), ledger.snapshot());
    }
}
