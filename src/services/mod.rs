//! Typed data helpers. Every function takes any connection or transaction and
//! wraps one or a few queries; handlers decide the transaction boundaries.

pub mod accounts;
pub mod checkout;
pub mod content;
pub mod customers;
pub mod dashboard;
pub mod home;
pub mod messages;
pub mod orders;
pub mod products;
pub mod storage;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Page request as it arrives in a query string. Missing or zero values fall
/// back to the first page and the default size.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageParams {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn page(&self) -> u64 {
        self.page.filter(|page| *page > 0).unwrap_or(1)
    }

    pub fn limit(&self) -> u64 {
        self.limit
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE)
    }

    /// Rows to skip. Capped at `i64::MAX`, the largest offset SQLite binds.
    pub fn offset(&self) -> u64 {
        (self.page() - 1)
            .saturating_mul(self.limit())
            .min(i64::MAX as u64)
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub rows: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    pub fn new(rows: Vec<T>, total: u64, params: &PageParams) -> Self {
        let limit = params.limit();
        Self {
            rows,
            total,
            page: params.page(),
            limit,
            total_pages: total.div_ceil(limit),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            rows: self.rows.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

/// `"asc"` or `"desc"` from a query string, descending by default.
pub fn sort_order(order: Option<&str>) -> sea_orm::Order {
    match order {
        Some("asc") => sea_orm::Order::Asc,
        _ => sea_orm::Order::Desc,
    }
}

/// Trims a free-text search term, treating blank input as absent.
pub fn search_term(query: Option<&str>) -> Option<String> {
    query
        .map(str::trim)
        .filter(|query| !query.is_empty())
        .map(str::to_string)
}
