//! Shared query parameter types for API handlers.

use serde::Deserialize;
use yamdb_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Clamped `(limit, offset)` ready to bind into a query.
    pub fn window(&self) -> (i64, i64) {
        page_window(self.limit, self.offset)
    }
}

/// List parameters for categories and genres (`?search=&limit=&offset=`).
///
/// `search` matches the name case-insensitively.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchParams {
    pub fn window(&self) -> (i64, i64) {
        page_window(self.limit, self.offset)
    }
}

/// List parameters for titles.
///
/// `category` and `genre` match slugs and `name` matches the title name, all
/// as case-insensitive substrings. `year` is an exact match.
#[derive(Debug, Default, Deserialize)]
pub struct TitleListParams {
    pub year: Option<i32>,
    pub category: Option<String>,
    pub genre: Option<String>,
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TitleListParams {
    pub fn window(&self) -> (i64, i64) {
        page_window(self.limit, self.offset)
    }
}

fn page_window(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        clamp_limit(limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE),
        clamp_offset(offset),
    )
}
