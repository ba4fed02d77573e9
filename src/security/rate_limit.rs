//! Per-caller fixed-window rate limiting.
//!
//! One record per caller key holds the window start and the number of
//! requests seen since. Expired records are swept lazily on each call; there
//! is no background task. Requests over the limit still increment the count.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::error::GatewayError;
use crate::observability::metrics;
use crate::security::clock::{Clock, SystemClock};

const FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Debug, Clone, Copy)]
struct ClientRateRecord {
    window_start: Instant,
    count: u64,
}

/// Fixed-window request counter keyed by caller.
#[derive(Debug)]
pub struct RateLimiter {
    records: DashMap<String, ClientRateRecord>,
    window: Duration,
    max_requests: u64,
    enabled: bool,
    trust_forwarded_for: bool,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            window: Duration::from_secs(config.window_secs),
            max_requests: config.max_requests,
            enabled: config.enabled,
            trust_forwarded_for: config.trust_forwarded_for,
            clock,
        }
    }

    /// Count a request from `caller_key` and report whether it is allowed.
    ///
    /// The read-modify-write happens under the key's shard lock, so
    /// concurrent requests for the same caller never undercount.
    pub fn check_and_record(&self, caller_key: &str) -> bool {
        if !self.enabled {
            return true;
        }

        let now = self.clock.now();
        self.sweep(now);

        let allowed = {
            let mut record = self
                .records
                .entry(caller_key.to_string())
                .or_insert(ClientRateRecord {
                    window_start: now,
                    count: 0,
                });

            if self.expired(&record, now) {
                record.window_start = now;
                record.count = 0;
            }
            record.count = record.count.saturating_add(1);
            record.count <= self.max_requests
        };

        metrics::record_tracked_clients(self.records.len());
        allowed
    }

    /// Number of callers with a live record.
    pub fn tracked_clients(&self) -> usize {
        self.records.len()
    }

    fn expired(&self, record: &ClientRateRecord, now: Instant) -> bool {
        now.saturating_duration_since(record.window_start) > self.window
    }

    fn sweep(&self, now: Instant) {
        self.records.retain(|_, record| !self.expired(record, now));
    }

    /// Identify the caller of a request.
    pub fn caller_key(&self, peer: Option<SocketAddr>, headers: &HeaderMap) -> String {
        if self.trust_forwarded_for {
            let forwarded = headers
                .get(FORWARDED_FOR)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty());
            if let Some(hop) = forwarded {
                return hop.to_string();
            }
        }

        peer.map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Middleware rejecting callers over their limit with 429.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = limiter.caller_key(peer, request.headers());

    if limiter.check_and_record(&key) {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
        metrics::record_rate_limited();
        GatewayError::RateLimited.into_response()
    }
}
