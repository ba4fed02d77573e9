//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Apply the rate limiter to the `/api` routes
//! - Serve with graceful shutdown

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::blockchain::{ConfirmationPoller, NodeClient, TxBuilder};
use crate::config::GatewayConfig;
use crate::http::request::{make_span, track_requests, MakeRequestUuid};
use crate::http::{account, health, transfer};
use crate::security::{rate_limit_middleware, RateLimiter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub node: Arc<dyn NodeClient>,
    pub limiter: Arc<RateLimiter>,
    pub builder: Arc<TxBuilder>,
    pub poller: Arc<ConfirmationPoller>,
}

impl AppState {
    pub fn new(node: Arc<dyn NodeClient>, config: &GatewayConfig) -> Self {
        Self::with_rate_limiter(node, config, RateLimiter::new(&config.rate_limit))
    }

    pub fn with_rate_limiter(
        node: Arc<dyn NodeClient>,
        config: &GatewayConfig,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            builder: Arc::new(TxBuilder::new(node.clone(), &config.transaction)),
            poller: Arc::new(ConfirmationPoller::new(node.clone(), &config.confirmation)),
            limiter: Arc::new(limiter),
            node,
        }
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &GatewayConfig, state: AppState) -> Router {
    let api = Router::new()
        .route("/account/new", post(account::create_account))
        .route("/account/balance", post(account::balance))
        .route("/transfer", post(transfer::transfer))
        .route_layer(middleware::from_fn_with_state(
            state.limiter.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.timeouts.request_secs,
        )))
        .layer(middleware::from_fn(track_requests))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
}

impl GatewayServer {
    /// Create a new server over an already connected node client.
    pub fn new(config: &GatewayConfig, node: Arc<dyn NodeClient>) -> Self {
        let state = AppState::new(node, config);
        Self {
            router: build_router(config, state),
        }
    }

    /// Run the server until `shutdown` resolves, then drain in-flight
    /// requests.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
