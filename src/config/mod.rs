//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to the endpoint layer
//!
//! node token file
//!     → loader.rs (load_node_token)
//!     → AlgodClient
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_node_token, ConfigError};
pub use schema::{
    ConfirmationConfig, GatewayConfig, ListenerConfig, LogFormat, NodeConfig,
    ObservabilityConfig, RateLimitConfig, SecurityConfig, TimeoutConfig, TransactionConfig,
    WaitStrategy,
};
