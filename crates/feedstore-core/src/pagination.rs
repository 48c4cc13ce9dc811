//! Page/limit normalization and pagination metadata.
//!
//! Pages are 1-based. An empty result set is presented as page 1 of 1.

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Normalize caller-supplied paging: `page <= 0` becomes 1, `limit <= 0`
/// becomes `default_limit`.
pub fn normalize(page: i64, limit: i64, default_limit: i64) -> (i64, i64) {
    let page = if page <= 0 {
        defaults::FIRST_PAGE
    } else {
        page
    };
    let limit = if limit <= 0 { default_limit } else { limit };
    (page, limit)
}

/// Row offset for a normalized page.
pub fn offset(page: i64, limit: i64) -> i64 {
    (page - 1).saturating_mul(limit)
}

/// Number of pages needed for `total` rows; never less than 1.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 1;
    }
    (total + limit - 1) / limit
}

/// A normalized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Build a request using the crate default page size for non-positive limits.
    pub fn new(page: i64, limit: i64) -> Self {
        Self::with_default_limit(page, limit, defaults::PAGE_LIMIT)
    }

    /// Build a request with an explicit fallback page size.
    pub fn with_default_limit(page: i64, limit: i64, default_limit: i64) -> Self {
        let (page, limit) = normalize(page, limit, default_limit);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        offset(self.page, self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(defaults::FIRST_PAGE, defaults::PAGE_LIMIT)
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page (1-based)
    pub page: i64,
    /// Maximum items per page
    pub limit: i64,
    /// Total number of items matching the query (across all pages)
    pub total: i64,
    /// Total number of pages (at least 1)
    pub total_pages: i64,
    /// True if more items are available after this page
    pub has_more: bool,
}

/// A page of results with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Paginated<T> {
    /// Wrap a page of rows, deriving `total_pages` and `has_more`.
    pub fn new(data: Vec<T>, total: i64, request: PageRequest) -> Self {
        let has_more = request.offset() + (data.len() as i64) < total;
        Self {
            data,
            pagination: PaginationMeta {
                page: request.page,
                limit: request.limit,
                total,
                total_pages: total_pages(total, request.limit),
                has_more,
            },
        }
    }

    /// An empty page 1 of 1.
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }
}
