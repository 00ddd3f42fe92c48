//! API Module
//!
//! HTTP handlers, rate-limit middleware and routing for the storefront API.
//!
//! # Endpoints
//! - `GET /api/products/optimized` - Cached product listing
//! - `PUT|DELETE /api/admin/products/:id` - Product writes with cache invalidation
//! - `DELETE /api/admin/cache/clear` - Cache clear
//! - `GET /api/admin/cache/stats` - Cache statistics
//! - `GET /api/health`, `GET /api/health/simple` - Health checks

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
