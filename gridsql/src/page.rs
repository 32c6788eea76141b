//! Result of a paired row/count query.

use crate::criteria::LimitOffset;

/// Rows of one page plus the total across all pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<Row> {
    pub rows: Vec<Row>,
    /// Sum of every count the count query returned.
    pub total: u64,
    /// Window the rows were fetched with, if paging was on.
    pub window: Option<LimitOffset>,
}

impl<Row> Page<Row> {
    pub const fn new(rows: Vec<Row>, total: u64, window: Option<LimitOffset>) -> Self {
        Self {
            rows,
            total,
            window,
        }
    }

    pub fn page_info(&self) -> PageInfo {
        let skip = self.window.map_or(0, |w| w.skip);
        let seen = skip.saturating_add(self.rows.len() as u64);
        PageInfo {
            has_next: seen < self.total,
            has_prev: skip > 0,
            total: self.total,
        }
    }

    /// Transform every row, keeping the totals.
    pub fn map<T, F: FnMut(Row) -> T>(self, f: F) -> Page<T> {
        Page {
            rows: self.rows.into_iter().map(f).collect(),
            total: self.total,
            window: self.window,
        }
    }
}

/// Page information for paginated responses.
///
/// # Example
///
/// ```
/// # use gridsql::{LimitOffset, Page};
/// let page = Page::new(vec!["a", "b"], 5, Some(LimitOffset::new(2, 2)));
/// let info = page.page_info();
///
/// assert!(info.has_next);
/// assert!(info.has_prev);
/// assert_eq!(info.total, 5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// Whether there are more rows after this page.
    pub has_next: bool,
    /// Whether there are rows before this page.
    pub has_prev: bool,
    pub total: u64,
}
