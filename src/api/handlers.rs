//! API Handlers
//!
//! HTTP request handlers for the product listing, admin and health endpoints.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use tracing::{debug, info, warn};

use crate::cache::{CacheInvalidator, CacheKeys, CacheStore, ConnectionState};
use crate::catalog::{Product, ProductQuery, ProductRepository};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    CacheClearParams, CacheClearResponse, CacheStatsResponse, Filters, HealthMetrics,
    HealthResponse, HealthStatus, Pagination, ProductListParams, ProductListResponse,
    ProductListing, ProductMutationResponse, ServiceStatus, Services, SimpleHealthResponse,
};
use crate::ratelimit::RateLimiter;

const DATABASE_SLOW_MS: f64 = 1000.0;
const CACHE_SLOW_MS: f64 = 500.0;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheStore>,
    pub limiter: RateLimiter,
    pub invalidator: CacheInvalidator,
    pub catalog: Arc<dyn ProductRepository>,
    pub environment: String,
    pub version: String,
    pub started_at: Instant,
}

impl AppState {
    /// Wires the limiter and invalidator to an existing cache store.
    pub fn new(cache: Arc<CacheStore>, catalog: Arc<dyn ProductRepository>, config: &Config) -> Self {
        Self {
            limiter: RateLimiter::new(Arc::clone(&cache), config.rate_limits.clone()),
            invalidator: CacheInvalidator::new(Arc::clone(&cache)),
            cache,
            catalog,
            environment: config.environment.clone(),
            version: config.version.clone(),
            started_at: Instant::now(),
        }
    }

    /// Builds a state with a fresh, not yet initialized cache store.
    pub fn from_config(config: &Config, catalog: Arc<dyn ProductRepository>) -> Self {
        let cache = Arc::new(CacheStore::new(config.cache.clone()));
        Self::new(cache, catalog, config)
    }

    fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

fn as_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Key under which one listing query is cached.
fn listing_cache_key(query: &ProductQuery) -> Result<String> {
    let encoded = serde_json::to_string(query)
        .map_err(|e| AppError::Internal(format!("encoding listing cache key: {e}")))?;
    Ok(format!("{}{}", CacheKeys::PRODUCTS, encoded))
}

// == Products ==
/// Handler for GET /api/products/optimized
///
/// Serves a filtered, sorted page of active products, from the cache when
/// an identical query was answered within its TTL.
pub async fn list_products_handler(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> Result<Json<ProductListResponse>> {
    let started = Instant::now();
    let (query, options) = params.validate().map_err(AppError::Validation)?;
    let cache_key = listing_cache_key(&query)?;

    if options.use_cache {
        if let Some(listing) = state.cache.get_json::<ProductListing>(&cache_key).await {
            debug!(key = %cache_key, "Serving products from cache");
            return Ok(Json(ProductListResponse::from_cache(listing, elapsed_ms(started))));
        }
    }

    let page = state.catalog.list(&query).await?;
    let listing = ProductListing {
        pagination: Pagination::new(query.page, query.limit, page.total_count),
        filters: Filters::from(&query),
        products: page.products,
    };

    if options.use_cache && !listing.products.is_empty() {
        if let Err(e) = state.cache.set_json(&cache_key, &listing, options.cache_ttl).await {
            warn!(key = %cache_key, error = %e, "Failed to cache product listing");
        }
    }

    let response_time = elapsed_ms(started);
    debug!(
        products = listing.products.len(),
        response_time_ms = response_time,
        "Products fetched"
    );
    Ok(Json(ProductListResponse::fresh(listing, response_time)))
}

// == Admin: Products ==
/// Handler for PUT /api/admin/products/:id
///
/// Writes the product through the repository, then drops every cached
/// listing and search result.
pub async fn upsert_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(product): Json<Product>,
) -> Result<Json<ProductMutationResponse>> {
    if product.id != id {
        return Err(AppError::Validation(format!(
            "body id '{}' does not match path id '{id}'",
            product.id
        )));
    }

    state.catalog.upsert(product).await?;
    let invalidated = invalidate_catalog_views(&state).await;
    info!(id = %id, invalidated, "Product saved");

    Ok(Json(ProductMutationResponse {
        success: true,
        id,
        invalidated,
    }))
}

/// Handler for DELETE /api/admin/products/:id
pub async fn delete_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductMutationResponse>> {
    if !state.catalog.remove(&id).await? {
        return Err(AppError::NotFound(format!("product {id}")));
    }

    let invalidated = invalidate_catalog_views(&state).await;
    info!(id = %id, invalidated, "Product deleted");

    Ok(Json(ProductMutationResponse {
        success: true,
        id,
        invalidated,
    }))
}

async fn invalidate_catalog_views(state: &AppState) -> usize {
    state.invalidator.invalidate_products().await + state.invalidator.invalidate_search().await
}

// == Admin: Cache ==
/// Handler for DELETE /api/admin/cache/clear
///
/// With `?pattern=` only matching keys go; without it the whole cache is flushed.
pub async fn clear_cache_handler(
    State(state): State<AppState>,
    Query(params): Query<CacheClearParams>,
) -> Json<CacheClearResponse> {
    match params.pattern.filter(|p| !p.is_empty()) {
        Some(pattern) => {
            let deleted = state.invalidator.invalidate_pattern(&pattern).await;
            info!(pattern = %pattern, deleted, "Cache entries cleared");
            Json(CacheClearResponse::pattern(&pattern, deleted))
        }
        None => {
            state.cache.clear().await;
            info!("Cache cleared");
            Json(CacheClearResponse::all())
        }
    }
}

/// Handler for GET /api/admin/cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        cache: state.cache.stats().await,
        rate_limits: state.limiter.stats().await,
    })
}

// == Health ==
/// Handler for GET /api/health
///
/// Probes the database and the cache backend. Answers 503 only when a
/// dependency is unhealthy; a degraded cache still serves from the fallback.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();

    let (database, cache) = tokio::join!(check_database(&state), check_cache(&state));
    let api = ServiceStatus::new(HealthStatus::Healthy, Some(as_ms(started.elapsed())), None);
    let status = HealthStatus::worst([database.status, cache.status, api.status]);

    let (cache_metrics, rate_limits) = tokio::join!(state.cache.stats(), state.limiter.stats());

    let body = HealthResponse {
        status,
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime: state.uptime_secs(),
        version: state.version.clone(),
        environment: state.environment.clone(),
        services: Services {
            database,
            cache,
            api,
        },
        metrics: HealthMetrics {
            cache: cache_metrics,
            rate_limits,
        },
    };

    let code = if status == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        code,
        [(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")],
        Json(body),
    )
}

async fn check_database(state: &AppState) -> ServiceStatus {
    let started = Instant::now();
    let result = state.catalog.ping().await;
    let elapsed = as_ms(started.elapsed());

    match result {
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            ServiceStatus::new(HealthStatus::Unhealthy, Some(elapsed), Some(e.to_string()))
        }
        Ok(()) if elapsed > DATABASE_SLOW_MS => {
            ServiceStatus::new(HealthStatus::Degraded, Some(elapsed), None)
        }
        Ok(()) => ServiceStatus::new(HealthStatus::Healthy, Some(elapsed), None),
    }
}

async fn check_cache(state: &AppState) -> ServiceStatus {
    if state.cache.connection_state().await != ConnectionState::Connected {
        return ServiceStatus::new(
            HealthStatus::Degraded,
            None,
            Some("Redis not connected, using fallback cache".to_string()),
        );
    }

    let started = Instant::now();
    let result = state.cache.ping_backend().await;
    let elapsed = as_ms(started.elapsed());

    match result {
        Some(Ok(())) if elapsed > CACHE_SLOW_MS => {
            ServiceStatus::new(HealthStatus::Degraded, Some(elapsed), None)
        }
        Some(Ok(())) => ServiceStatus::new(HealthStatus::Healthy, Some(elapsed), None),
        Some(Err(e)) => ServiceStatus::new(
            HealthStatus::Degraded,
            Some(elapsed),
            Some(format!("Cache ping failed, using fallback cache: {e}")),
        ),
        None => ServiceStatus::new(
            HealthStatus::Degraded,
            None,
            Some("Redis not connected, using fallback cache".to_string()),
        ),
    }
}

/// Handler for GET /api/health/simple
pub async fn simple_health_handler(State(state): State<AppState>) -> Json<SimpleHealthResponse> {
    Json(SimpleHealthResponse::ok(state.uptime_secs()))
}

/// Fallback for unmatched routes.
pub async fn not_found_handler(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, InMemoryCatalog, Variant};
    use chrono::Utc;

    fn product(id: &str, price: f64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            description: String::new(),
            category: Category {
                id: "c1".to_string(),
                name: "Meals".to_string(),
                slug: "meals".to_string(),
            },
            display_order: 0,
            is_active: true,
            variants: vec![Variant {
                id: format!("{id}-v"),
                price,
            }],
            created_at: Utc::now(),
        }
    }

    fn test_state(products: Vec<Product>) -> AppState {
        AppState::from_config(&Config::default(), Arc::new(InMemoryCatalog::new(products)))
    }

    #[tokio::test]
    async fn test_listing_is_cached_after_first_call() {
        let state = test_state(vec![product("p1", 50.0)]);

        let Json(first) = list_products_handler(State(state.clone()), Query(ProductListParams::default()))
            .await
            .unwrap();
        assert!(!first.performance.cache_hit);
        assert_eq!(first.listing.products.len(), 1);

        let Json(second) = list_products_handler(State(state), Query(ProductListParams::default()))
            .await
            .unwrap();
        assert!(second.performance.cache_hit);
        assert_eq!(second.cached, Some(true));
        assert_eq!(second.listing, first.listing);
    }

    #[tokio::test]
    async fn test_use_cache_false_bypasses_cache() {
        let state = test_state(vec![product("p1", 50.0)]);
        let params = ProductListParams {
            use_cache: Some("false".to_string()),
            ..ProductListParams::default()
        };

        list_products_handler(State(state.clone()), Query(params.clone()))
            .await
            .unwrap();
        let Json(second) = list_products_handler(State(state.clone()), Query(params))
            .await
            .unwrap();

        assert!(!second.performance.cache_hit);
        assert!(state.cache.keys("products:*").await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_page_is_not_cached() {
        let state = test_state(vec![]);

        list_products_handler(State(state.clone()), Query(ProductListParams::default()))
            .await
            .unwrap();

        assert!(state.cache.keys("products:*").await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_params_are_rejected() {
        let state = test_state(vec![]);
        let params = ProductListParams {
            limit: Some("500".to_string()),
            ..ProductListParams::default()
        };

        let err = list_products_handler(State(state), Query(params))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_unknown_product_is_not_found() {
        let state = test_state(vec![]);
        let err = delete_product_handler(State(state), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_upsert_rejects_mismatched_id() {
        let state = test_state(vec![]);
        let err = upsert_product_handler(State(state), Path("p2".to_string()), Json(product("p1", 10.0)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_upsert_invalidates_listing_and_search() {
        let state = test_state(vec![product("p1", 50.0)]);
        list_products_handler(State(state.clone()), Query(ProductListParams::default()))
            .await
            .unwrap();
        state.cache.set("search:tuna", b"[]".to_vec(), 60).await;
        state.cache.set("orders:1", b"{}".to_vec(), 60).await;

        let Json(result) =
            upsert_product_handler(State(state.clone()), Path("p1".to_string()), Json(product("p1", 60.0)))
                .await
                .unwrap();

        assert_eq!(result.invalidated, 2);
        assert!(state.cache.keys("products:*").await.is_empty());
        assert!(state.cache.get("search:tuna").await.is_none());
        assert!(state.cache.get("orders:1").await.is_some());
    }

    #[tokio::test]
    async fn test_cache_check_without_backend_is_degraded() {
        let state = test_state(vec![]);
        let status = check_cache(&state).await;
        assert_eq!(status.status, HealthStatus::Degraded);
        assert!(status.error.unwrap().contains("fallback"));
    }
}
