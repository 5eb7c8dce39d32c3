use std::collections::{BTreeMap, VecDeque};
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use super::event::{Event, SubjectId, Timestamp};

/// Default number of events retained in history.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Chronological, bounded event window.
///
/// The capacity is not part of the persisted form; it is applied by the
/// owning ledger on every insert and once at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(VecDeque<Event>);

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, evicting the oldest one if the window is full.
    pub fn push_bounded(&mut self, event: Event, capacity: NonZeroUsize) -> Option<Event> {
        self.0.push_back(event);
        if self.0.len() > capacity.get() {
            self.0.pop_front()
        } else {
            None
        }
    }

    /// Drop the oldest entries until at most `capacity` remain.
    pub fn truncate_front(&mut self, capacity: NonZeroUsize) -> usize {
        let surplus = self.0.len().saturating_sub(capacity.get());
        self.0.drain(..surplus);
        surplus
    }

    /// Copy of the last `min(limit, len)` events, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<Event> {
        let skip = self.0.len().saturating_sub(limit);
        self.0.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.0.iter()
    }
}

impl FromIterator<Event> for History {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The persisted unit: history plus the last-seen index.
///
/// Both fields may be absent in a stored document and default to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub history: History,
    #[serde(default)]
    pub last_seen: BTreeMap<SubjectId, Timestamp>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.history.is_empty() && self.last_seen.is_empty()
    }
}
