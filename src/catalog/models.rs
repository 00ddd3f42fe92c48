//! Catalog Models
//!
//! Product rows as served by the repository, and the listing query over them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub price: f64,
}

/// A product row with its category and variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub variants: Vec<Variant>,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Product {
    /// Cheapest variant price, 0 when the product has no variants.
    pub fn min_price(&self) -> f64 {
        self.variants
            .iter()
            .map(|v| v.price)
            .min_by(f64::total_cmp)
            .unwrap_or(0.0)
    }

    pub fn max_price(&self) -> f64 {
        self.variants
            .iter()
            .map(|v| v.price)
            .max_by(f64::total_cmp)
            .unwrap_or(0.0)
    }
}

/// Listing row: the product plus derived category and price fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub category_name: String,
    pub category_slug: String,
    pub min_price: f64,
    pub max_price: f64,
    pub variant_count: usize,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            display_order: product.display_order,
            created_at: product.created_at,
            category_name: product.category.name.clone(),
            category_slug: product.category.slug.clone(),
            min_price: product.min_price(),
            max_price: product.max_price(),
            variant_count: product.variants.len(),
        }
    }
}

// == Query ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceRange {
    #[serde(rename = "under-100")]
    Under100,
    #[serde(rename = "100-200")]
    From100To200,
    #[serde(rename = "200-400")]
    From200To400,
    #[serde(rename = "above-400")]
    Above400,
}

impl PriceRange {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "under-100" => Some(PriceRange::Under100),
            "100-200" => Some(PriceRange::From100To200),
            "200-400" => Some(PriceRange::From200To400),
            "above-400" => Some(PriceRange::Above400),
            _ => None,
        }
    }

    pub fn contains(&self, price: f64) -> bool {
        match self {
            PriceRange::Under100 => price < 100.0,
            PriceRange::From100To200 => (100.0..200.0).contains(&price),
            PriceRange::From200To400 => (200.0..400.0).contains(&price),
            PriceRange::Above400 => price >= 400.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    DisplayOrder,
    Name,
    PriceAsc,
    PriceDesc,
    CreatedAt,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "display_order" => Some(SortOrder::DisplayOrder),
            "name" => Some(SortOrder::Name),
            "price_asc" => Some(SortOrder::PriceAsc),
            "price_desc" => Some(SortOrder::PriceDesc),
            "created_at" => Some(SortOrder::CreatedAt),
            _ => None,
        }
    }
}

/// Validated listing filters. Field order is the cache key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub price_range: Option<PriceRange>,
    pub page: u32,
    pub limit: u32,
    pub sort: SortOrder,
}

impl ProductQuery {
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit as usize
    }
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            price_range: None,
            page: 1,
            limit: 20,
            sort: SortOrder::DisplayOrder,
        }
    }
}

/// One page of results plus the total match count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<ProductSummary>,
    pub total_count: usize,
}
