//! Request DTOs for the storefront API
//!
//! Raw query strings as received, and their validation into typed queries.

use serde::Deserialize;

use crate::catalog::{PriceRange, ProductQuery, SortOrder};

const MAX_SEARCH_CHARS: usize = 100;
const MAX_LIMIT: u32 = 50;
const MIN_CACHE_TTL: u64 = 30;
const MAX_CACHE_TTL: u64 = 3600;
const DEFAULT_CACHE_TTL: u64 = 300;

/// Query string for `GET /api/products/optimized`.
///
/// Every field arrives as text; [`validate`](Self::validate) does the typing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductListParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub price_range: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub use_cache: Option<String>,
    pub cache_ttl: Option<String>,
}

/// Per-request caching options for the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    pub use_cache: bool,
    pub cache_ttl: u64,
}

impl ProductListParams {
    /// Validates the parameters, collecting every problem into one message.
    pub fn validate(&self) -> Result<(ProductQuery, CacheOptions), String> {
        let mut issues = Vec::new();

        let search = non_empty(&self.search);
        if let Some(search) = &search {
            if search.chars().count() > MAX_SEARCH_CHARS {
                issues.push(format!("search must be at most {MAX_SEARCH_CHARS} characters"));
            }
        }

        let price_range = non_empty(&self.price_range).and_then(|raw| {
            let parsed = PriceRange::parse(&raw);
            if parsed.is_none() {
                issues.push(
                    "price_range must be one of under-100, 100-200, 200-400, above-400".to_string(),
                );
            }
            parsed
        });

        let page = match non_empty(&self.page) {
            None => 1,
            Some(raw) => match raw.parse::<u32>() {
                Ok(page) if page >= 1 => page,
                _ => {
                    issues.push("page must be a positive integer".to_string());
                    1
                }
            },
        };

        let limit = match non_empty(&self.limit) {
            None => 20,
            Some(raw) => match raw.parse::<u32>() {
                Ok(limit) if (1..=MAX_LIMIT).contains(&limit) => limit,
                _ => {
                    issues.push(format!("limit must be an integer between 1 and {MAX_LIMIT}"));
                    20
                }
            },
        };

        let sort = match non_empty(&self.sort) {
            None => SortOrder::default(),
            Some(raw) => SortOrder::parse(&raw).unwrap_or_else(|| {
                issues.push(
                    "sort must be one of display_order, name, price_asc, price_desc, created_at"
                        .to_string(),
                );
                SortOrder::default()
            }),
        };

        let cache_ttl = match non_empty(&self.cache_ttl) {
            None => DEFAULT_CACHE_TTL,
            Some(raw) => match raw.parse::<u64>() {
                Ok(ttl) if (MIN_CACHE_TTL..=MAX_CACHE_TTL).contains(&ttl) => ttl,
                _ => {
                    issues.push(format!(
                        "cache_ttl must be an integer between {MIN_CACHE_TTL} and {MAX_CACHE_TTL}"
                    ));
                    DEFAULT_CACHE_TTL
                }
            },
        };

        if !issues.is_empty() {
            return Err(issues.join(", "));
        }

        Ok((
            ProductQuery {
                search,
                category: non_empty(&self.category),
                price_range,
                page,
                limit,
                sort,
            },
            CacheOptions {
                use_cache: self.use_cache.as_deref() != Some("false"),
                cache_ttl,
            },
        ))
    }
}

/// Query string for `DELETE /api/admin/cache/clear`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheClearParams {
    pub pattern: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}
