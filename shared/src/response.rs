//! Pagination types shared by list endpoints

use serde::{Deserialize, Serialize};

/// Pagination metadata (1-based pages)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32, total: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(per_page as u64) as u32
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// A page of items plus its pagination metadata
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        Self {
            items,
            pagination: Pagination::new(page, per_page, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_math() {
        let first = Pagination::new(1, 10, 25);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next());
        assert!(!first.has_prev());

        let last = Pagination::new(3, 10, 25);
        assert!(!last.has_next());
        assert!(last.has_prev());

        let exact = Pagination::new(1, 10, 30);
        assert_eq!(exact.total_pages, 3);
    }

    #[test]
    fn test_zero_per_page_is_harmless() {
        assert_eq!(Pagination::new(1, 0, 25).total_pages, 0);
    }
}
