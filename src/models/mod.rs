//! Request and Response models for the storefront API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{CacheClearParams, CacheOptions, ProductListParams};
pub use responses::{
    CacheClearResponse, CacheStatsResponse, Filters, HealthMetrics, HealthResponse, HealthStatus,
    Pagination, Performance, ProductListResponse, ProductListing, ProductMutationResponse,
    RateLimitedResponse, ServiceStatus, Services, SimpleHealthResponse,
};
