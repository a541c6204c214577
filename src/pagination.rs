use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Highest page whose offset still fits in an `i64` at the largest page size.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

/// Raw `?page=&limit=` values. Unparseable values fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: i64,
    pub limit: i64,
}

impl Default for PaginationParams {
    fn default() -> Self {
        PaginationParams {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl From<PaginationQuery> for PaginationParams {
    fn from(query: PaginationQuery) -> Self {
        let parse = |raw: Option<String>| raw.and_then(|v| v.trim().parse::<i64>().ok());

        let page = parse(query.page).map_or(1, |p| p.clamp(1, MAX_PAGE));
        let limit = parse(query.limit).map_or(DEFAULT_PAGE_SIZE, |l| l.clamp(1, MAX_PAGE_SIZE));

        PaginationParams { page, limit }
    }
}

impl PaginationParams {
    /// Row offset for the requested page.
    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: i64, params: PaginationParams) -> Self {
        let total_pages = (total + params.limit - 1) / params.limit;

        PaginatedResponse {
            data,
            pagination: PageInfo {
                page: params.page,
                limit: params.limit,
                total,
                total_pages,
                has_next: params.page < total_pages,
                has_previous: params.page > 1,
            },
        }
    }
}
