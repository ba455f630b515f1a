//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Highest page number a list endpoint accepts.
pub const MAX_PAGE: u64 = 1_000_000;

/// Largest offset the database driver can bind as a signed 64-bit value.
const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// Resolved pagination parameters.
///
/// Built by [`crate::PaginationConfig::resolve`], which applies defaults and caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    pub page: u64,
    /// Number of items per page.
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl PageRequest {
    /// Calculates the offset for database queries, capped at `i64::MAX`.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        let offset = self.page.saturating_sub(1).saturating_mul(self.limit);
        if offset > MAX_OFFSET {
            MAX_OFFSET
        } else {
            offset
        }
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub items: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number.
    pub page: u64,
    /// Items per page.
    pub limit: u64,
    /// Total number of items across all pages.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl<T> PageResponse<T> {
    /// Creates a new paginated response.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        let total_pages = if total == 0 || request.limit == 0 {
            1
        } else {
            total.div_ceil(request.limit)
        };

        Self {
            items,
            meta: PageMeta {
                page: request.page,
                limit: request.limit,
                total,
                total_pages,
            },
        }
    }

    /// Maps the items while keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 10, 0)]
    #[case(2, 10, 10)]
    #[case(5, 25, 100)]
    #[case(0, 10, 0)]
    fn test_offset(#[case] page: u64, #[case] limit: u64, #[case] expected: u64) {
        assert_eq!(PageRequest { page, limit }.offset(), expected);
    }

    #[rstest]
    #[case(u64::MAX, 100)]
    #[case(1 << 62, 100)]
    #[case(u64::MAX, u64::MAX)]
    fn test_offset_fits_signed_bind(#[case] page: u64, #[case] limit: u64) {
        let offset = PageRequest { page, limit }.offset();
        assert!(i64::try_from(offset).is_ok());
        assert_eq!(offset, i64::MAX.unsigned_abs());
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(10, 1)]
    #[case(11, 2)]
    #[case(95, 10)]
    fn test_total_pages(#[case] total: u64, #[case] expected: u64) {
        let page = PageResponse::new(Vec::<i32>::new(), PageRequest { page: 1, limit: 10 }, total);
        assert_eq!(page.meta.total_pages, expected);
    }

    #[test]
    fn test_map_keeps_meta() {
        let page = PageResponse::new(vec![1, 2], PageRequest { page: 2, limit: 2 }, 5);
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20]);
        assert_eq!(mapped.meta.page, 2);
        assert_eq!(mapped.meta.total_pages, 3);
    }
}
