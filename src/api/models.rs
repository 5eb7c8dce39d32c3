//! API models for the lastseen HTTP surface.
//!
//! - `POST /events` accepts a [`RecordEventRequest`] and echoes the stored [`Event`]
//! - `GET /events/recent` returns [`RecentEventsResponse`], oldest first
//! - `GET /subjects/{subject_id}/last-seen` returns [`LastSeenResponse`]
//! - `POST /inactivity` accepts an [`InactivityRequest`] and returns one page
//!   of classifications as an [`InactivityReport`](crate::query::InactivityReport)
//!
//! # Inactivity request
//!
//! ```json
//! {
//!   "roster": [
//!     { "subject_id": "1", "display_name": "A" },
//!     { "subject_id": "2", "display_name": "B" }
//!   ],
//!   "threshold": "30d",
//!   "page": 1,
//!   "include_active": false
//! }
//! ```
//!
//! `threshold` falls back to `query.inactivity_threshold` and `page` to 1.

use serde::{Deserialize, Serialize};

use crate::humanize::HumanDuration;
use crate::ledger::{Event, EventKind, SubjectId, Timestamp};
use crate::observability::MetricsSnapshot;
use crate::query::RosterEntry;

#[derive(Debug, Deserialize, Clone)]
pub struct RecordEventRequest {
    pub subject_id: SubjectId,
    pub kind: EventKind,
    /// Defaults to the server clock
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RecentEventsParams {
    /// Negative values are treated as zero
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecentEventsResponse {
    pub events: Vec<Event>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LastSeenResponse {
    pub subject_id: SubjectId,
    pub last_seen: Timestamp,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InactivityRequest {
    pub roster: Vec<RosterEntry>,
    #[serde(default)]
    pub threshold: Option<HumanDuration>,
    /// 1-based
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub include_active: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,
}
