//! Activity ledger: bounded event history plus a per-subject last-seen index
//!
//! The ledger records discrete subject actions (messages, reactions, voice
//! joins) and keeps two views of them:
//!
//! - `history`: the newest `capacity` events in arrival order (FIFO window)
//! - `last_seen`: subject id -> timestamp of its latest event, never pruned
//!
//! Both are persisted together as one [`Snapshot`] through a
//! [`SnapshotStore`]. Every `record` rewrites the whole snapshot atomically.
//!
//! ## Backends
//!
//! - [`FileStore`]: one JSON document, replaced via temp file + rename
//! - [`FjallStore`]: one key in a fjall keyspace
//! - [`MemoryStore`]: in-process, for tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lastseen::ledger::{FileStore, Ledger, Timestamp};
//!
//! let mut ledger = Ledger::open(Box::new(FileStore::new("data/activity.json")), capacity)?;
//! ledger.record("42", "message", Timestamp::now())?;
//! let seen = ledger.last_seen(&"42".into());
//! ```

pub mod error;
pub mod event;
pub mod history;
pub mod legacy;
pub mod shared;
pub mod store;
pub mod tracker;

pub use error::{LedgerError, Result};
pub use event::{Event, EventKind, SubjectId, Timestamp};
pub use history::{DEFAULT_CAPACITY, History, Snapshot};
pub use shared::SharedLedger;
pub use store::{FileStore, FjallStore, MemoryStore, SnapshotStore, open_store};
pub use tracker::Ledger;
