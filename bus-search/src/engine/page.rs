//! Pagination over a ranked match list.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Invalid pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("page must be at least 1")]
    ZeroPage,

    #[error("page size must be at least 1")]
    ZeroPageSize,
}

/// A validated page cursor: 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Create a cursor. Both values must be at least 1.
    pub fn new(page: u32, page_size: u32) -> Result<Self, PageError> {
        if page == 0 {
            return Err(PageError::ZeroPage);
        }
        if page_size == 0 {
            return Err(PageError::ZeroPageSize);
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Slice bounds of this page within `total` results, clamped so pages
    /// past the end are empty rather than out of range.
    pub fn range(&self, total: usize) -> Range<usize> {
        let size = self.page_size as usize;
        let start = (self.page as usize - 1).saturating_mul(size).min(total);
        let end = start.saturating_add(size).min(total);
        start..end
    }

    /// Number of pages needed for `total` results.
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size as usize)
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<S> {
    /// Requested page, echoed back
    pub current_page: u32,

    /// `ceil(total_results / page_size)`
    pub total_pages: usize,

    /// Length of the full match list
    pub total_results: usize,

    /// This page's slice of the match list
    pub results: Vec<S>,
}

impl<S> Page<S> {
    /// The response for an empty query.
    pub fn empty() -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            total_results: 0,
            results: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero() {
        assert_eq!(PageRequest::new(0, 10), Err(PageError::ZeroPage));
        assert_eq!(PageRequest::new(1, 0), Err(PageError::ZeroPageSize));
    }

    #[test]
    fn range_for_pages() {
        let first = PageRequest::new(1, 10).unwrap();
        assert_eq!(first.range(25), 0..10);

        let last = PageRequest::new(3, 10).unwrap();
        assert_eq!(last.range(25), 20..25);

        let past = PageRequest::new(4, 10).unwrap();
        assert_eq!(past.range(25), 25..25);
    }

    #[test]
    fn huge_page_number_does_not_overflow() {
        let page = PageRequest::new(u32::MAX, u32::MAX).unwrap();
        assert_eq!(page.range(7), 7..7);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = PageRequest::new(1, 10).unwrap();
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(1), 1);
        assert_eq!(page.total_pages(10), 1);
        assert_eq!(page.total_pages(11), 2);
    }

    #[test]
    fn empty_page_shape() {
        let page: Page<String> = Page::empty();
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "currentPage": 1,
                "totalPages": 0,
                "totalResults": 0,
                "results": []
            })
        );
    }
}
