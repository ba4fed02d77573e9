//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Algorand node connection settings.
    pub node: NodeConfig,

    /// Per-caller request throttling.
    pub rate_limit: RateLimitConfig,

    /// Confirmation polling budget.
    pub confirmation: ConfirmationConfig,

    /// Transaction construction settings.
    pub transaction: TransactionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Algorand node (algod) connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Base URL of the algod REST API.
    pub address: String,

    /// File holding the algod API token.
    pub token_path: String,

    /// Inline token. Takes precedence over `token_path` when set.
    pub token: Option<String>,

    /// Timeout for ordinary node requests in seconds.
    pub request_timeout_secs: u64,

    /// Timeout for the node's wait-for-block call in seconds.
    pub wait_timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            address: "http://localhost:8080".to_string(),
            token_path: "/algod/data/algod.token".to_string(),
            token: None,
            request_timeout_secs: 10,
            wait_timeout_secs: 30,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Length of the counting window in seconds.
    pub window_secs: u64,

    /// Maximum requests per caller within one window.
    pub max_requests: u64,

    /// Use the first `X-Forwarded-For` hop as the caller key.
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 3600,
            max_requests: 100,
            trust_forwarded_for: false,
        }
    }
}

/// How the poller waits between two pending-transaction queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitStrategy {
    /// Block on the node until the next round is produced.
    NodeRound,
    /// Sleep `poll_interval_ms` between queries.
    FixedInterval,
}

/// Confirmation polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Rounds to wait for a terminal state before reporting a timeout.
    pub max_rounds_to_wait: u64,

    /// Wait primitive used between polls.
    pub wait_strategy: WaitStrategy,

    /// Sleep between polls for `fixed_interval`, in milliseconds.
    pub poll_interval_ms: u64,

    /// Wall-clock budget for the whole poll loop in seconds.
    pub timeout_secs: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            max_rounds_to_wait: 10,
            wait_strategy: WaitStrategy::NodeRound,
            poll_interval_ms: 3000,
            timeout_secs: 60,
        }
    }
}

/// Transaction construction settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Number of rounds a transaction stays valid after its first valid round.
    pub validity_window: u64,

    /// Maximum note size in bytes.
    pub max_note_bytes: usize,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            validity_window: 1000,
            max_note_bytes: 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 90 }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = GatewayConfig::default();
        assert_eq!(config.rate_limit.window_secs, 3600);
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.confirmation.max_rounds_to_wait, 10);
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.node.address, "http://localhost:8080");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [rate_limit]
            max_requests = 5

            [confirmation]
            wait_strategy = "fixed_interval"
            "#,
        )
        .unwrap();

        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window_secs, 3600);
        assert_eq!(config.confirmation.wait_strategy, WaitStrategy::FixedInterval);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }
}
