//! Page-number pagination (`?page=N&limit=M`).

use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: i64 = 6;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw query parameters; missing or non-positive values fall back to defaults.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn from_params(params: PageParams, default_limit: i64) -> Self {
        let page = params.page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = params
            .limit
            .filter(|l| *l >= 1)
            .unwrap_or(default_limit)
            .clamp(1, MAX_PAGE_SIZE);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Page 1 always exists (possibly empty); later pages must hold at least one row.
    pub fn is_valid_for(&self, total: i64) -> bool {
        self.page == 1 || self.offset() < total
    }

    pub fn next_page(&self, total: i64) -> Option<i64> {
        (self.offset() + self.limit < total).then_some(self.page + 1)
    }

    pub fn previous_page(&self) -> Option<i64> {
        (self.page > 1).then_some(self.page - 1)
    }
}
