use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// Page request after clamping: `page >= 1`, `1 <= limit <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        PageRequest {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * (self.limit as i64)
    }

    pub fn limit(&self) -> i64 {
        self.limit as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(None, None)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page: u32,
    pub pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let total = total.max(0);
        let limit = request.limit.max(1) as i64;
        let pages = ((total + limit - 1) / limit) as u32;

        Pagination {
            total,
            page: request.page,
            pages,
            has_next: request.page < pages,
            has_prev: request.page > 1,
        }
    }
}

/// A page of rows plus the unpaged total.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: i64,
}

/// Bare `page`/`limit` query for listings without filters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ASC", alias = "asc", alias = "Asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc", alias = "Desc")]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_page_of_fifteen() {
        let pagination = Pagination::new(PageRequest::new(Some(2), Some(10)), 15);
        assert_eq!(pagination, Pagination {
            total: 15,
            page: 2,
            pages: 2,
            has_next: false,
            has_prev: true,
        });
    }

    #[test]
    fn empty_result_has_no_pages() {
        let pagination = Pagination::new(PageRequest::default(), 0);
        assert_eq!(pagination.pages, 0);
        assert!(!pagination.has_next);
        assert!(!pagination.has_prev);
    }

    #[test]
    fn requests_are_clamped() {
        let request = PageRequest::new(Some(0), Some(10_000));
        assert_eq!(request, PageRequest { page: 1, limit: 100 });
        assert_eq!(PageRequest::new(Some(3), Some(0)).offset(), 2);
    }

    #[test]
    fn sort_order_accepts_either_case() {
        let upper: SortOrder = serde_json::from_str("\"DESC\"").unwrap();
        let lower: SortOrder = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(upper, SortOrder::Desc);
        assert_eq!(lower, SortOrder::Desc);
    }
}
