//! Read-side queries over the ledger
//!
//! - [`InactivityQuery`] classifies a roster against the last-seen index
//! - [`paginate`] splits any ordered result into fixed-size pages
//! - [`report_page`] filters a classification and selects one page of it
//!
//! Neither formats output; presenters own rendering.

pub mod inactivity;
pub mod paginate;
pub mod report;

pub use inactivity::{
    Classification, InactivityQuery, LastSeenIndex, RosterEntry, Status, inactive_only,
};
pub use paginate::{Page, paginate};
pub use report::{InactivityReport, ReportError, report_page};
