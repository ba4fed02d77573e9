//! HTTP gateway in front of an Algorand node.
//!
//! Callers hold only a 25-word recovery phrase. The gateway throttles them,
//! derives their key per request, builds and signs payments, submits them
//! and polls the node until each is confirmed, rejected or out of budget.

pub mod blockchain;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use http::{build_router, AppState, GatewayServer};
pub use lifecycle::Shutdown;
