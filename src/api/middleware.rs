//! Rate Limit Middleware
//!
//! Applies the fixed-window limiter to every `/api/*` request and reports
//! the client's quota in response headers.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use super::handlers::AppState;
use crate::models::RateLimitedResponse;
use crate::ratelimit::{is_rate_limited_path, ClientFingerprint, RateDecision};

const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if !is_rate_limited_path(&path) {
        return next.run(request).await;
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = ClientFingerprint::from_request(request.headers(), peer);
    let decision = state.limiter.check(&path, &client).await;

    if !decision.allowed {
        warn!(path = %path, retry_after = decision.retry_after_secs, "Rate limit exceeded");
        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(RateLimitedResponse::new(decision.retry_after_secs)),
        )
            .into_response();
        let headers = response.headers_mut();
        insert_quota_headers(headers, &decision);
        headers.insert(header::RETRY_AFTER, HeaderValue::from(decision.retry_after_secs));
        return response;
    }

    let mut response = next.run(request).await;
    insert_quota_headers(response.headers_mut(), &decision);
    response
}

fn insert_quota_headers(headers: &mut HeaderMap, decision: &RateDecision) {
    headers.insert(
        HeaderName::from_static(X_RATELIMIT_LIMIT),
        HeaderValue::from(decision.limit),
    );
    headers.insert(
        HeaderName::from_static(X_RATELIMIT_REMAINING),
        HeaderValue::from(decision.remaining),
    );
    // Epoch milliseconds
    headers.insert(
        HeaderName::from_static(X_RATELIMIT_RESET),
        HeaderValue::from(decision.reset_at_ms),
    );
}
