//! Page/limit parsing and the paginated response envelope shared by every list endpoint.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const PAGINATION_ERROR: &str = "Pagination error";
pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 5;
pub const MAX_LIMIT: i64 = 250;

/// Raw `page` and `limit` query parameters, kept as strings so that a non-numeric
/// value produces the pagination error instead of a generic extractor failure.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// A validated page request: `page >= 1`, `1 <= limit <= MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self, AppError> {
        let page = parse_or(page, DEFAULT_PAGE)?;
        let limit = parse_or(limit, DEFAULT_LIMIT)?;
        if page < 1 || !(1..=MAX_LIMIT).contains(&limit) {
            return Err(pagination_error());
        }
        Ok(Self { page, limit })
    }

    /// Saturates, so a page far past the end still yields an empty result.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl PageQuery {
    pub fn page(&self) -> Result<Page, AppError> {
        Page::parse(self.page.as_deref(), self.limit.as_deref())
    }
}

fn parse_or(value: Option<&str>, default: i64) -> Result<i64, AppError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| pagination_error()),
    }
}

fn pagination_error() -> AppError {
    AppError::BadRequest(PAGINATION_ERROR.into())
}

/// `{ total, hasNext, hasPrev, results }`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub total: i64,
    pub has_next: bool,
    pub has_prev: bool,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// `hasNext` compares against `max(total, limit)`, so a result set that fits in one
    /// page never reports a next page.
    pub fn new(page: Page, total: i64, results: Vec<T>) -> Self {
        Self {
            total,
            has_next: page.limit.saturating_mul(page.page) < total.max(page.limit),
            has_prev: page.page > 1,
            results,
        }
    }
}
