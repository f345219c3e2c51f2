//! Pagination utilities for list endpoints

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::store::PageRequest;

/// Pagination query parameters
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct PaginationParams {
    /// Page number (1-indexed)
    pub page: Option<u32>,

    /// Items per page
    pub limit: Option<u32>,
}

impl PaginationParams {
    /// Maximum allowed items per page
    pub const MAX_LIMIT: u32 = 100;

    /// Returns the page (1-indexed, minimum 1)
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Returns the clamped limit value
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(10).clamp(1, Self::MAX_LIMIT)
    }

    pub fn to_page_request(self) -> PageRequest {
        PageRequest {
            page: self.page(),
            limit: self.limit(),
        }
    }
}

/// Pagination metadata.
///
/// The key names are a wire-compatibility surface; clients parse exactly
/// `page`, `limit`, `total` and `pages`.
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

impl PaginationMeta {
    pub fn new(params: &PaginationParams, total: u64) -> Self {
        let limit = params.limit();
        let pages = ((total as f64) / (limit as f64)).ceil() as u32;

        Self {
            page: params.page(),
            limit,
            total,
            pages,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams, total: u64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(params, total),
        }
    }
}

impl<T: Serialize> IntoResponse for Paginated<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
