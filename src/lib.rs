//! Storefront Cache - availability-first caching and rate limiting for a storefront API
//!
//! Caches product listings in Redis with an in-process fallback, limits
//! request rates per client, and invalidates cached views on product writes.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod ratelimit;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
