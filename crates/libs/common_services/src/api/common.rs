use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    #[must_use]
    pub const fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

/// `page`/`limit` query parameters. Out-of-range values fall back to the defaults.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub const MAX_PAGE_SIZE: i64 = 100;

impl PageParams {
    /// Resolves to `(page, limit, offset)`.
    #[must_use]
    pub fn resolve(self, default_limit: i64) -> (i64, i64, i64) {
        let page = self.page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = self
            .limit
            .filter(|l| *l >= 1)
            .unwrap_or(default_limit)
            .min(MAX_PAGE_SIZE);
        (page, limit, (page - 1) * limit)
    }
}
