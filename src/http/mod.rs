//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, span, metrics)
//!     → security::rate_limit (/api routes only)
//!     → health.rs / account.rs / transfer.rs
//!     → crate::error (taxonomy → status code + JSON body)
//! ```

pub mod account;
pub mod health;
pub mod request;
pub mod server;
pub mod transfer;

pub use request::X_REQUEST_ID;
pub use server::{build_router, AppState, GatewayServer};
