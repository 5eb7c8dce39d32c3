use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::inactivity::{Classification, inactive_only};
use super::paginate::paginate;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("threshold must be positive")]
    ZeroThreshold,

    #[error("pages are numbered from 1")]
    PageZero,

    #[error("page {page} of {total}")]
    PageOutOfRange { page: usize, total: usize },
}

/// One page of an inactivity report, as served to presenters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactivityReport {
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
    pub entries: Vec<Classification>,
}

/// Filter classifications and cut out the requested 1-based page.
///
/// Active subjects are dropped unless `include_active` is set. An empty
/// result still has page 1.
pub fn report_page(
    classified: Vec<Classification>,
    include_active: bool,
    page_size: NonZeroUsize,
    page: usize,
) -> Result<InactivityReport, ReportError> {
    if page == 0 {
        return Err(ReportError::PageZero);
    }

    let matches = if include_active {
        classified
    } else {
        inactive_only(classified)
    };

    let pages = paginate(&matches, page_size);
    let selected = pages.get(page - 1).ok_or(ReportError::PageOutOfRange {
        page,
        total: pages.len(),
    })?;

    Ok(InactivityReport {
        page: selected.number,
        total_pages: selected.total,
        total_matches: matches.len(),
        entries: selected.items.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{SubjectId, Timestamp};
    use crate::query::Status;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn entry(id: &str, status: Status) -> Classification {
        Classification {
            subject_id: SubjectId::from(id),
            display_name: id.to_uppercase(),
            status,
        }
    }

    fn sample() -> Vec<Classification> {
        let since = Timestamp::from_unix(1_700_000_000).unwrap();
        vec![
            entry("a", Status::Active),
            entry("b", Status::NeverSeen),
            entry("c", Status::InactiveSince(since)),
            entry("d", Status::NeverSeen),
        ]
    }

    #[test]
    fn test_filters_active_by_default() {
        let report = report_page(sample(), false, size(2), 1).unwrap();

        assert_eq!(report.total_matches, 3);
        assert_eq!(report.total_pages, 2);
        let ids: Vec<&str> = report.entries.iter().map(|c| c.subject_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_include_active_keeps_everything() {
        let report = report_page(sample(), true, size(2), 2).unwrap();

        assert_eq!(report.page, 2);
        assert_eq!(report.total_matches, 4);
        let ids: Vec<&str> = report.entries.iter().map(|c| c.subject_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d"]);
    }

    #[test]
    fn test_page_zero_rejected() {
        assert_eq!(
            report_page(sample(), false, size(2), 0),
            Err(ReportError::PageZero)
        );
    }

    #[test]
    fn test_page_past_end() {
        assert_eq!(
            report_page(sample(), false, size(2), 3),
            Err(ReportError::PageOutOfRange { page: 3, total: 2 })
        );
    }

    #[test]
    fn test_empty_is_one_empty_page() {
        let report = report_page(Vec::new(), false, size(15), 1).unwrap();
        assert_eq!(
            report,
            InactivityReport {
                page: 1,
                total_pages: 1,
                total_matches: 0,
                entries: Vec::new(),
            }
        );

        // All active filters down to the same empty page
        let only_active = vec![entry("a", Status::Active)];
        let report = report_page(only_active, false, size(15), 1).unwrap();
        assert_eq!(report.total_pages, 1);
        assert!(report.entries.is_empty());
    }
}
