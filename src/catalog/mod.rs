//! Catalog Module
//!
//! Seam to the product database. The service only ever reads and writes
//! products through [`ProductRepository`].

mod memory;
mod models;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::InMemoryCatalog;
pub use models::{
    Category, PriceRange, Product, ProductPage, ProductQuery, ProductSummary, SortOrder, Variant,
};

/// Failure reported by the product database.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    Query(String),
}

/// Product storage as seen by the HTTP handlers.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Returns one page of active products matching `query`.
    async fn list(&self, query: &ProductQuery) -> Result<ProductPage, CatalogError>;

    /// Inserts or replaces a product by id.
    async fn upsert(&self, product: Product) -> Result<(), CatalogError>;

    /// Removes a product. Returns whether it existed.
    async fn remove(&self, id: &str) -> Result<bool, CatalogError>;

    /// Cheap round trip used by health checks.
    async fn ping(&self) -> Result<(), CatalogError>;
}
