use serde::Serialize;

use crate::error::AppError;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// A validated page request. Both fields are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

fn positive(raw: Option<&str>, name: &str, default: u64) -> Result<u64, AppError> {
    let raw = match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw,
        None => return Ok(default),
    };
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(AppError::validation(format!("{} must be a positive integer", name))),
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT }
    }
}

impl Pagination {
    pub fn new(page: u64, limit: u64) -> Result<Self, AppError> {
        if page == 0 {
            return Err(AppError::validation("page must be a positive integer"));
        }
        if limit == 0 {
            return Err(AppError::validation("limit must be a positive integer"));
        }
        Ok(Pagination { page, limit: limit.min(MAX_LIMIT) })
    }

    /// Parses raw query-string values. Missing or blank values fall back to
    /// the defaults; zero, negative and non-numeric values are rejected.
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Result<Self, AppError> {
        let page = positive(page, "page", DEFAULT_PAGE)?;
        let limit = positive(limit, "limit", DEFAULT_LIMIT)?;
        Pagination::new(page, limit)
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }

    pub fn meta(&self, total: u64) -> PageMeta {
        PageMeta {
            total,
            page: self.page,
            limit: self.limit,
            pages: self.pages(total),
        }
    }

    /// Cuts `[skip, skip + limit)` out of an already ordered result set.
    pub fn window<T>(&self, items: Vec<T>) -> Vec<T> {
        let skip = usize::try_from(self.skip()).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(limit).collect()
    }
}
