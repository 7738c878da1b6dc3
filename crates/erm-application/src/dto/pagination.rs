//! Page requests and paginated responses

use serde::{Deserialize, Serialize};

/// Page size used when the client does not ask for one
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page a client may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Normalized 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a request with the standard limits
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self::with_limits(page, page_size, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }

    /// Build a request, defaulting missing values and clamping the size
    ///
    /// Page 0 is treated as page 1; sizes are clamped to `1..=max_size`.
    pub fn with_limits(
        page: Option<u32>,
        page_size: Option<u32>,
        default_size: u32,
        max_size: u32,
    ) -> Self {
        let max_size = max_size.max(1);
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(default_size).clamp(1, max_size),
        }
    }

    /// Number of items skipped before this page
    ///
    /// Page 0 reads as page 1 for requests built without `with_limits`.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.page_size as usize)
    }
}

/// One page of results plus totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Cut the requested page out of the full, already ordered result set
    pub fn paginate(all: Vec<T>, request: PageRequest) -> Self {
        let page_size = request.page_size.max(1);
        let total = all.len();
        let items = all
            .into_iter()
            .skip(request.offset())
            .take(page_size as usize)
            .collect();
        Self {
            items,
            total,
            page: request.page.max(1),
            page_size,
            total_pages: total.div_ceil(page_size as usize) as u32,
        }
    }

    /// Convert every item, keeping the page metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        assert_eq!(PageRequest::new(None, None), PageRequest::default());
        assert_eq!(PageRequest::new(Some(0), Some(0)).page, 1);
        assert_eq!(PageRequest::new(Some(0), Some(0)).page_size, 1);
        assert_eq!(PageRequest::new(Some(2), Some(500)).page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_paginate() {
        let page = Page::paginate((1..=45).collect::<Vec<_>>(), PageRequest::new(Some(3), None));
        assert_eq!(page.items, vec![41, 42, 43, 44, 45]);
        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = Page::paginate(vec![1, 2, 3], PageRequest::new(Some(5), Some(2)));
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_unnormalized_request_reads_as_first_page() {
        let raw: PageRequest = serde_json::from_str(r#"{"page":0,"page_size":0}"#).unwrap();
        assert_eq!(raw.offset(), 0);

        let page = Page::paginate(vec![1, 2, 3], raw);
        assert_eq!(page.items, vec![1]);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_empty_result() {
        let page: Page<u8> = Page::paginate(Vec::new(), PageRequest::default());
        assert_eq!(page.total_pages, 0);
    }
}
