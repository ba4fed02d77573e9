//! Request identification and per-request instrumentation.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID when the caller sends none
//! - Attach method, path and request ID to the request span
//! - Record request count and latency per endpoint
//!
//! # Design Decisions
//! - Request ID is set before tracing so every log line carries it
//! - Endpoint labels are a fixed set to keep metric cardinality bounded

use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

use crate::observability::metrics;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID header, if present.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Span for `TraceLayer`.
pub fn make_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request),
    )
}

/// Metric label for a request path.
pub fn endpoint_label(path: &str) -> &'static str {
    match path {
        "/health" => "health",
        "/api/account/new" => "account_new",
        "/api/account/balance" => "account_balance",
        "/api/transfer" => "transfer",
        _ => "other",
    }
}

/// Middleware recording request count and latency.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let endpoint = endpoint_label(request.uri().path());
    let response = next.run(request).await;
    metrics::record_request(endpoint, response.status().as_u16(), start);
    response
}
