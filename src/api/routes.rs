//! API Routes
//!
//! Configures the Axum router with all storefront endpoints.

use axum::{
    middleware,
    routing::{delete, get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats_handler, clear_cache_handler, delete_product_handler, health_handler,
    list_products_handler, not_found_handler, simple_health_handler, upsert_product_handler,
    AppState,
};
use super::middleware::rate_limit;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/products/optimized` - Cached, filtered product listing
/// - `PUT /api/admin/products/:id` - Upsert a product
/// - `DELETE /api/admin/products/:id` - Delete a product
/// - `DELETE /api/admin/cache/clear` - Clear the cache, optionally by pattern
/// - `GET /api/admin/cache/stats` - Cache and rate-limit statistics
/// - `GET /api/health` - Dependency health report
/// - `GET /api/health/simple` - Liveness probe
///
/// # Middleware
/// - Rate limiting on every `/api/*` route
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/products/optimized", get(list_products_handler))
        .route(
            "/api/admin/products/:id",
            put(upsert_product_handler).delete(delete_product_handler),
        )
        .route("/api/admin/cache/clear", delete(clear_cache_handler))
        .route("/api/admin/cache/stats", get(cache_stats_handler))
        .route("/api/health", get(health_handler))
        .route("/api/health/simple", get(simple_health_handler))
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::catalog::InMemoryCatalog;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let state = AppState::from_config(&Config::default(), Arc::new(InMemoryCatalog::default()));
        create_router(state)
    }

    #[tokio::test]
    async fn test_simple_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health/simple")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-ratelimit-limit"));
    }

    #[tokio::test]
    async fn test_products_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/products/optimized")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/nothing-here")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_assets_skip_rate_limit() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/static/logo.png")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(!response.headers().contains_key("x-ratelimit-limit"));
    }
}
