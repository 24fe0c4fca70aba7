//! Pagination primitives
//!
//! Two strategies over the same id-descending ordering:
//!
//! - **Counting pagination** ([`Paginate`]): a full count plus an explicit
//!   page/offset window. Exact page numbers, O(table) count cost.
//! - **Fast pagination** ([`CursorRequest`]): boundary cursors around the
//!   currently displayed window. No count; every page costs O(page size).
//!   A bare page number with no boundary context degrades to an
//!   approximate offset window, still without counting.

use serde::{Deserialize, Serialize};

/// Counting pagination state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginate {
    pub total: i64,
    pub per_page: i64,
    pub page: i64,
    pub page_count: i64,
}

impl Paginate {
    /// Clamp the requested page into the valid range for `total` rows
    pub fn new(total: i64, page: Option<i64>, per_page: i64) -> Self {
        let per_page = per_page.max(1);
        let page_count = (total + per_page - 1) / per_page;
        let page = page.unwrap_or(1).clamp(1, page_count.max(1));
        Self {
            total,
            per_page,
            page,
            page_count,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }
}

/// One fast-pagination request, resolved from the caller's cursor context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorRequest {
    /// No context: the newest page
    First,
    /// The page after the current one: rows strictly below the
    /// bottommost displayed id
    Forward { below: i64 },
    /// The page before the current one: rows strictly above the topmost
    /// displayed id
    Backward { above: i64 },
    /// The currently displayed page again: rows at or below the topmost
    /// displayed id
    Refresh { top: i64 },
    /// Explicit page number without usable boundary context; served as
    /// an approximate offset window
    Jump { page: i64 },
}

impl CursorRequest {
    /// Resolve the request from raw query parameters: the requested page,
    /// the page currently displayed, and its boundary ids.
    pub fn from_query(
        page: Option<i64>,
        curr_page: Option<i64>,
        curr_top: Option<i64>,
        curr_bottom: Option<i64>,
    ) -> Self {
        let page = page.unwrap_or(1).max(1);
        match (curr_page, curr_top, curr_bottom) {
            (Some(curr), Some(top), Some(bottom)) => {
                if page == curr + 1 {
                    Self::Forward { below: bottom }
                } else if page == curr - 1 && page >= 1 {
                    Self::Backward { above: top }
                } else if page == curr {
                    Self::Refresh { top }
                } else if page == 1 {
                    Self::First
                } else {
                    Self::Jump { page }
                }
            }
            _ if page == 1 => Self::First,
            _ => Self::Jump { page },
        }
    }

    /// The id window and scan direction this request selects
    pub fn window(&self, per_page: i64) -> PageWindow {
        match *self {
            Self::First => PageWindow {
                below: None,
                above: None,
                ascending: false,
                offset: 0,
            },
            Self::Forward { below } => PageWindow {
                below: Some(below),
                above: None,
                ascending: false,
                offset: 0,
            },
            Self::Backward { above } => PageWindow {
                below: None,
                above: Some(above),
                ascending: true,
                offset: 0,
            },
            Self::Refresh { top } => PageWindow {
                below: Some(top + 1),
                above: None,
                ascending: false,
                offset: 0,
            },
            Self::Jump { page } => PageWindow {
                below: None,
                above: None,
                ascending: false,
                offset: (page - 1) * per_page,
            },
        }
    }

    /// The page number the served window should be labelled with
    pub fn page_number(&self, curr_page: Option<i64>) -> i64 {
        match *self {
            Self::First => 1,
            Self::Forward { .. } => curr_page.map_or(2, |c| c + 1),
            Self::Backward { .. } => curr_page.map_or(1, |c| (c - 1).max(1)),
            Self::Refresh { .. } => curr_page.unwrap_or(1),
            Self::Jump { page } => page,
        }
    }
}

/// Boundary predicate + scan order for one fast page.
///
/// `ascending` means the store scans id ascending and the result must be
/// reversed before serving (backward paging); the served order is always
/// id descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub below: Option<i64>,
    pub above: Option<i64>,
    pub ascending: bool,
    pub offset: i64,
}

/// Metadata accompanying one fast page; `curr_top`/`curr_bottom` are the
/// boundary markers the caller hands back on its next request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastPageMeta {
    pub page: i64,
    pub per_page: i64,
    pub curr_top: Option<i64>,
    pub curr_bottom: Option<i64>,
    pub has_prev: bool,
    pub has_next: bool,
}

impl FastPageMeta {
    /// Derive the markers from the served ids (descending order)
    pub fn from_ids(page: i64, per_page: i64, ids: &[i64], has_prev: bool, has_next: bool) -> Self {
        Self {
            page,
            per_page,
            curr_top: ids.first().copied(),
            curr_bottom: ids.last().copied(),
            has_prev,
            has_next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference evaluation of a window against an id-descending stream,
    /// mirroring what the store-side query does
    fn apply(window: &PageWindow, ids_desc: &[i64], per_page: i64) -> Vec<i64> {
        let filtered: Vec<i64> = ids_desc
            .iter()
            .copied()
            .filter(|&id| window.below.is_none_or(|b| id < b))
            .filter(|&id| window.above.is_none_or(|a| id > a))
            .collect();

        let mut rows: Vec<i64> = if window.ascending {
            let mut asc: Vec<i64> = filtered;
            asc.reverse();
            asc.into_iter().take(per_page as usize).collect()
        } else {
            filtered
                .into_iter()
                .skip(window.offset as usize)
                .take(per_page as usize)
                .collect()
        };

        if window.ascending {
            rows.reverse();
        }
        rows
    }

    fn stream() -> Vec<i64> {
        (1..=100).rev().collect()
    }

    #[test]
    fn test_counting_paginate_clamps_page() {
        let p = Paginate::new(95, Some(7), 10);
        assert_eq!(p.page_count, 10);
        assert_eq!(p.page, 7);
        assert_eq!(p.offset(), 60);

        let clamped = Paginate::new(95, Some(99), 10);
        assert_eq!(clamped.page, 10);
        assert!(clamped.has_prev());
        assert!(!clamped.has_next());

        let empty = Paginate::new(0, None, 10);
        assert_eq!(empty.page, 1);
        assert_eq!(empty.page_count, 0);
    }

    #[test]
    fn test_first_page_without_boundary_context() {
        let req = CursorRequest::from_query(None, None, None, None);
        assert_eq!(req, CursorRequest::First);
        let ids = apply(&req.window(10), &stream(), 10);
        assert_eq!(ids, (91..=100).rev().collect::<Vec<i64>>());
    }

    #[test]
    fn test_forward_page_selects_strictly_below_boundary() {
        let req = CursorRequest::from_query(Some(2), Some(1), Some(100), Some(91));
        assert_eq!(req, CursorRequest::Forward { below: 91 });
        let ids = apply(&req.window(10), &stream(), 10);
        assert_eq!(ids, (81..=90).rev().collect::<Vec<i64>>());

        let meta = FastPageMeta::from_ids(2, 10, &ids, true, true);
        assert_eq!(meta.curr_top, Some(90));
        assert_eq!(meta.curr_bottom, Some(81));
    }

    #[test]
    fn test_forward_from_boundary_91_returns_90_down_to_81() {
        // the cursor alone determines the window
        let req = CursorRequest::Forward { below: 91 };
        let ids = apply(&req.window(10), &stream(), 10);
        assert_eq!(ids.first(), Some(&90));
        assert_eq!(ids.last(), Some(&81));
    }

    #[test]
    fn test_refreshing_current_page_reserves_same_window() {
        // re-requesting the displayed page serves the same ids again
        let req = CursorRequest::from_query(Some(1), Some(1), Some(100), Some(91));
        assert_eq!(req, CursorRequest::Refresh { top: 100 });
        assert_eq!(req.page_number(Some(1)), 1);
        let ids = apply(&req.window(10), &stream(), 10);
        assert_eq!(ids, (91..=100).rev().collect::<Vec<i64>>());
    }

    #[test]
    fn test_refreshing_a_middle_page_keeps_its_label() {
        let req = CursorRequest::from_query(Some(3), Some(3), Some(80), Some(71));
        assert_eq!(req, CursorRequest::Refresh { top: 80 });
        assert_eq!(req.page_number(Some(3)), 3);
        let ids = apply(&req.window(10), &stream(), 10);
        assert_eq!(ids, (71..=80).rev().collect::<Vec<i64>>());
    }

    #[test]
    fn test_backward_page_selects_strictly_above_boundary() {
        let req = CursorRequest::from_query(Some(1), Some(2), Some(90), Some(81));
        assert_eq!(req, CursorRequest::Backward { above: 90 });
        let ids = apply(&req.window(10), &stream(), 10);
        assert_eq!(ids, (91..=100).rev().collect::<Vec<i64>>());
    }

    #[test]
    fn test_backward_near_top_serves_partial_window() {
        let req = CursorRequest::Backward { above: 95 };
        let ids = apply(&req.window(10), &stream(), 10);
        assert_eq!(ids, (96..=100).rev().collect::<Vec<i64>>());
    }

    #[test]
    fn test_jump_without_context_approximates_offset() {
        let req = CursorRequest::from_query(Some(3), None, None, None);
        assert_eq!(req, CursorRequest::Jump { page: 3 });
        let ids = apply(&req.window(10), &stream(), 10);
        assert_eq!(ids, (71..=80).rev().collect::<Vec<i64>>());
    }

    #[test]
    fn test_forward_past_last_row_is_empty() {
        let req = CursorRequest::Forward { below: 1 };
        let ids = apply(&req.window(10), &stream(), 10);
        assert!(ids.is_empty());
    }
}
