//! Response DTOs for the storefront API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::{Deserialize, Serialize};

use crate::cache::CacheStatsSnapshot;
use crate::catalog::{PriceRange, ProductQuery, ProductSummary, SortOrder};
use crate::ratelimit::RateLimitStats;

// == Product Listing ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total_count: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total_count: usize) -> Self {
        let offset = (page.saturating_sub(1) as usize) * limit as usize;
        Self {
            page,
            limit,
            total_count,
            total_pages: total_count.div_ceil(limit.max(1) as usize),
            has_next: offset + (limit as usize) < total_count,
            has_prev: page > 1,
        }
    }
}

/// Echo of the filters the listing was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    pub search: Option<String>,
    pub category: Option<String>,
    pub price_range: Option<PriceRange>,
    pub sort: SortOrder,
}

impl From<&ProductQuery> for Filters {
    fn from(query: &ProductQuery) -> Self {
        Self {
            search: query.search.clone(),
            category: query.category.clone(),
            price_range: query.price_range,
            sort: query.sort,
        }
    }
}

/// The cacheable part of a listing response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductListing {
    pub products: Vec<ProductSummary>,
    pub pagination: Pagination,
    pub filters: Filters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Performance {
    /// Handler time in milliseconds
    pub response_time: u64,
    pub cache_hit: bool,
    pub products_count: usize,
}

/// Body of `GET /api/products/optimized`.
#[derive(Debug, Clone, Serialize)]
pub struct ProductListResponse {
    #[serde(flatten)]
    pub listing: ProductListing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    pub performance: Performance,
}

impl ProductListResponse {
    pub fn fresh(listing: ProductListing, response_time: u64) -> Self {
        let products_count = listing.products.len();
        Self {
            listing,
            cached: None,
            performance: Performance {
                response_time,
                cache_hit: false,
                products_count,
            },
        }
    }

    pub fn from_cache(listing: ProductListing, response_time: u64) -> Self {
        let products_count = listing.products.len();
        Self {
            listing,
            cached: Some(true),
            performance: Performance {
                response_time,
                cache_hit: true,
                products_count,
            },
        }
    }
}

// == Admin ==
/// Body of `DELETE /api/admin/cache/clear`.
#[derive(Debug, Clone, Serialize)]
pub struct CacheClearResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<usize>,
}

impl CacheClearResponse {
    pub fn pattern(pattern: &str, deleted: usize) -> Self {
        Self {
            success: true,
            message: format!("Cleared {deleted} cache entries matching '{pattern}'"),
            deleted: Some(deleted),
        }
    }

    pub fn all() -> Self {
        Self {
            success: true,
            message: "Cache cleared".to_string(),
            deleted: None,
        }
    }
}

/// Body of `GET /api/admin/cache/stats`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsResponse {
    pub cache: CacheStatsSnapshot,
    pub rate_limits: RateLimitStats,
}

/// Body of the product mutation endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ProductMutationResponse {
    pub success: bool,
    pub id: String,
    /// Cache entries dropped as a consequence of the write
    pub invalidated: usize,
}

// == Rate Limiting ==
/// Body of a 429 response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitedResponse {
    pub error: String,
    pub message: String,
    pub retry_after: u64,
}

impl RateLimitedResponse {
    pub fn new(retry_after: u64) -> Self {
        Self {
            error: "Rate limit exceeded".to_string(),
            message: format!("Too many requests. Try again in {retry_after} seconds."),
            retry_after,
        }
    }
}

// == Health ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// The worst of a set of statuses.
    pub fn worst(statuses: impl IntoIterator<Item = HealthStatus>) -> HealthStatus {
        statuses.into_iter().max().unwrap_or(HealthStatus::Healthy)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub last_check: String,
}

impl ServiceStatus {
    pub fn new(status: HealthStatus, response_time: Option<f64>, error: Option<String>) -> Self {
        Self {
            status,
            response_time: response_time.map(|ms| (ms * 100.0).round() / 100.0),
            error,
            last_check: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Services {
    pub database: ServiceStatus,
    pub cache: ServiceStatus,
    pub api: ServiceStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    pub cache: CacheStatsSnapshot,
    pub rate_limits: RateLimitStats,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Seconds since startup
    pub uptime: u64,
    pub version: String,
    pub environment: String,
    pub services: Services,
    pub metrics: HealthMetrics,
}

/// Body of `GET /api/health/simple`.
#[derive(Debug, Clone, Serialize)]
pub struct SimpleHealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: u64,
}

impl SimpleHealthResponse {
    pub fn ok(uptime: u64) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime,
        }
    }
}
