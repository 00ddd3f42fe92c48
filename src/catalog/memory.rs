//! In-Memory Catalog
//!
//! Process-local product table, optionally seeded from a JSON file.

use std::cmp::Ordering;
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use super::{CatalogError, Product, ProductPage, ProductQuery, ProductRepository, ProductSummary, SortOrder};

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<Vec<Product>>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
        }
    }

    /// Loads a JSON array of products from `path`.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog file {}", path.display()))?;
        let products: Vec<Product> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing catalog file {}", path.display()))?;
        info!(count = products.len(), path = %path.display(), "Catalog loaded");
        Ok(Self::new(products))
    }
}

fn matches(product: &Product, query: &ProductQuery) -> bool {
    if !product.is_active {
        return false;
    }
    if let Some(search) = &query.search {
        if !product.name.to_lowercase().contains(&search.to_lowercase()) {
            return false;
        }
    }
    if let Some(category) = &query.category {
        if &product.category.slug != category {
            return false;
        }
    }
    if let Some(range) = query.price_range {
        if !range.contains(product.min_price()) {
            return false;
        }
    }
    true
}

fn compare(a: &Product, b: &Product, sort: SortOrder) -> Ordering {
    match sort {
        SortOrder::DisplayOrder => a.display_order.cmp(&b.display_order),
        SortOrder::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortOrder::PriceAsc => a.min_price().total_cmp(&b.min_price()),
        SortOrder::PriceDesc => b.min_price().total_cmp(&a.min_price()),
        SortOrder::CreatedAt => b.created_at.cmp(&a.created_at),
    }
}

#[async_trait]
impl ProductRepository for InMemoryCatalog {
    async fn list(&self, query: &ProductQuery) -> Result<ProductPage, CatalogError> {
        let products = self.products.read().await;

        let mut matched: Vec<&Product> = products.iter().filter(|p| matches(p, query)).collect();
        matched.sort_by(|a, b| compare(a, b, query.sort).then_with(|| a.id.cmp(&b.id)));

        let total_count = matched.len();
        let page = matched
            .into_iter()
            .skip(query.offset())
            .take(query.limit as usize)
            .map(ProductSummary::from)
            .collect();

        Ok(ProductPage {
            products: page,
            total_count,
        })
    }

    async fn upsert(&self, product: Product) -> Result<(), CatalogError> {
        let mut products = self.products.write().await;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => products.push(product),
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool, CatalogError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() != before)
    }

    async fn ping(&self) -> Result<(), CatalogError> {
        Ok(())
    }
}
