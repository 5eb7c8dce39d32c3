use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use time::Duration;

use super::report::ReportError;
use crate::ledger::{Ledger, SubjectId, Timestamp};

/// Anything that can answer "when was this subject last seen".
pub trait LastSeenIndex {
    fn last_seen(&self, subject_id: &SubjectId) -> Option<Timestamp>;
}

impl LastSeenIndex for Ledger {
    fn last_seen(&self, subject_id: &SubjectId) -> Option<Timestamp> {
        Ledger::last_seen(self, subject_id)
    }
}

impl LastSeenIndex for BTreeMap<SubjectId, Timestamp> {
    fn last_seen(&self, subject_id: &SubjectId) -> Option<Timestamp> {
        self.get(subject_id).copied()
    }
}

/// A known subject as supplied by the roster provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub subject_id: SubjectId,
    pub display_name: String,
}

impl RosterEntry {
    pub fn new(subject_id: impl Into<SubjectId>, display_name: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            display_name: display_name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "since", rename_all = "snake_case")]
pub enum Status {
    NeverSeen,
    InactiveSince(Timestamp),
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub subject_id: SubjectId,
    pub display_name: String,
    /// Serialized inline as `status` plus an optional `since`
    #[serde(flatten)]
    pub status: Status,
}

impl Classification {
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }
}

/// Partitions a roster into never-seen, inactive and active subjects.
///
/// `now` is always supplied by the caller so results are reproducible.
#[derive(Debug, Clone, Copy)]
pub struct InactivityQuery {
    threshold: Duration,
}

impl InactivityQuery {
    pub fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    /// Like [`InactivityQuery::new`], rejecting a zero or negative threshold.
    pub fn try_new(threshold: Duration) -> Result<Self, ReportError> {
        if threshold.is_positive() {
            Ok(Self::new(threshold))
        } else {
            Err(ReportError::ZeroThreshold)
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Classify every roster entry, in roster order.
    ///
    /// Duplicate subject ids keep their first occurrence. A subject is
    /// inactive only when strictly more than the threshold has elapsed.
    pub fn classify<'a, I, L>(&self, roster: I, index: &L, now: Timestamp) -> Vec<Classification>
    where
        I: IntoIterator<Item = &'a RosterEntry>,
        L: LastSeenIndex + ?Sized,
    {
        let mut seen = HashSet::new();
        let mut classified = Vec::new();
        for entry in roster {
            if !seen.insert(&entry.subject_id) {
                continue;
            }
            classified.push(Classification {
                subject_id: entry.subject_id.clone(),
                display_name: entry.display_name.clone(),
                status: self.status_of(index.last_seen(&entry.subject_id), now),
            });
        }
        classified
    }

    fn status_of(&self, last_seen: Option<Timestamp>, now: Timestamp) -> Status {
        match last_seen {
            None => Status::NeverSeen,
            Some(at) if now - at > self.threshold => Status::InactiveSince(at),
            Some(_) => Status::Active,
        }
    }
}

/// Drop active subjects, keeping order.
pub fn inactive_only(classifications: Vec<Classification>) -> Vec<Classification> {
    classifications
        .into_iter()
        .filter(|c| !c.is_active())
        .collect()
}
