//! # Pagination Support
//!
//! Page-number pagination as exposed by the HTTP API, and the limit/offset
//! form the SQL layer consumes.

use serde::{Deserialize, Serialize};

/// Default page size when the client does not ask for one
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a client may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page request structure (1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page_number: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Create a page request, clamping to page >= 1 and 1 <= size <= MAX_PAGE_SIZE
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number: page_number.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Build from optional query parameters, falling back to defaults
    pub fn from_query(page: Option<u32>, limit: Option<u32>) -> Self {
        let defaults = Self::default();
        Self::new(
            page.unwrap_or(defaults.page_number),
            limit.unwrap_or(defaults.page_size),
        )
    }

    /// Convert to offset-based pagination
    pub fn to_pagination(&self) -> Pagination {
        Pagination::new(
            self.page_size,
            (self.page_number - 1).saturating_mul(self.page_size),
        )
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Pagination {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}

/// Page result structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_count: u64,
    /// Zero when there are no records at all
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Create new page from items and request
    pub fn new(items: Vec<T>, request: &PageRequest, total_count: u64) -> Self {
        let page_size = u64::from(request.page_size.max(1));
        let total_pages = total_count.div_ceil(page_size);

        Self {
            items,
            page_number: request.page_number,
            page_size: request.page_size,
            total_count,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.page_number < self.total_pages
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_number > 1
    }

    /// Transform the items, keeping the page metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }
}
