use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};

use crate::query::{Classification, InactivityQuery, RosterEntry};

use super::error::Result;
use super::event::{Event, EventKind, SubjectId, Timestamp};
use super::tracker::Ledger;

/// Cloneable handle that serializes writers and lets readers share access.
///
/// `record` holds the write lock across the append, the index update and the
/// save, so readers never observe history and index out of step.
#[derive(Clone, Debug)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    pub async fn record(
        &self,
        subject_id: impl Into<SubjectId>,
        kind: impl Into<EventKind>,
        timestamp: Timestamp,
    ) -> Result<()> {
        self.inner.write().await.record(subject_id, kind, timestamp)
    }

    pub async fn record_event(&self, event: Event) -> Result<()> {
        self.inner.write().await.record_event(event)
    }

    pub async fn last_seen(&self, subject_id: &SubjectId) -> Option<Timestamp> {
        self.inner.read().await.last_seen(subject_id)
    }

    pub async fn recent_events(&self, limit: usize) -> Vec<Event> {
        self.inner.read().await.recent_events(limit)
    }

    /// Run an inactivity query against one consistent view of the index.
    pub async fn classify(
        &self,
        query: &InactivityQuery,
        roster: &[RosterEntry],
        now: Timestamp,
    ) -> Vec<Classification> {
        let ledger = self.inner.read().await;
        query.classify(roster, &*ledger, now)
    }

    /// Hold the read lock for several queries against one consistent state.
    pub async fn read(&self) -> RwLockReadGuard<'_, Ledger> {
        self.inner.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::store::MemoryStore;
    use std::num::NonZeroUsize;

    fn shared(capacity: usize) -> SharedLedger {
        let ledger = Ledger::open(
            Box::new(MemoryStore::new()),
            NonZeroUsize::new(capacity).unwrap(),
        )
        .unwrap();
        SharedLedger::new(ledger)
    }

    #[tokio::test]
    async fn test_concurrent_records_are_not_lost() {
        let ledger = shared(1000);
        let base = Timestamp::from_unix(1_750_000_000).unwrap();

        let mut handles = Vec::new();
        for task in 0..8u64 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    ledger
                        .record(task, "message", base + time::Duration::seconds(i))
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let guard = ledger.read().await;
        assert_eq!(guard.len(), 200);
        assert_eq!(guard.subject_count(), 8);
    }

    #[tokio::test]
    async fn test_reads_see_recorded_state() {
        let ledger = shared(10);
        let at = Timestamp::from_unix(1_750_000_000).unwrap();

        ledger.record("7", "reaction", at).await.unwrap();

        assert_eq!(ledger.last_seen(&"7".into()).await, Some(at));
        assert_eq!(ledger.recent_events(10).await.len(), 1);
    }

    #[tokio::test]
    async fn test_classify_uses_ledger_index() {
        use crate::query::Status;

        let ledger = shared(10);
        let now = Timestamp::from_unix(1_750_000_000).unwrap();
        ledger
            .record("old", "message", now - time::Duration::days(60))
            .await
            .unwrap();

        let roster = vec![RosterEntry::new("old", "Old"), RosterEntry::new("new", "New")];
        let query = InactivityQuery::new(time::Duration::days(30));
        let result = ledger.classify(&query, &roster, now).await;

        assert_eq!(
            result[0].status,
            Status::InactiveSince(now - time::Duration::days(60))
        );
        assert_eq!(result[1].status, Status::NeverSeen);
    }
}
