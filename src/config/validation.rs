//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that the request timeout leaves room for confirmation polling
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    match url::Url::parse(&config.node.address) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "node.address",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("node.address", e.to_string())),
    }

    if config.node.request_timeout_secs == 0 {
        errors.push(ValidationError::new("node.request_timeout_secs", "must be > 0"));
    }
    if config.node.wait_timeout_secs == 0 {
        errors.push(ValidationError::new("node.wait_timeout_secs", "must be > 0"));
    }

    if config.rate_limit.enabled {
        if config.rate_limit.window_secs == 0 {
            errors.push(ValidationError::new("rate_limit.window_secs", "must be > 0"));
        }
        if config.rate_limit.max_requests == 0 {
            errors.push(ValidationError::new("rate_limit.max_requests", "must be > 0"));
        }
    }

    if config.confirmation.max_rounds_to_wait == 0 {
        errors.push(ValidationError::new(
            "confirmation.max_rounds_to_wait",
            "must be > 0",
        ));
    }
    if config.confirmation.poll_interval_ms == 0 {
        errors.push(ValidationError::new("confirmation.poll_interval_ms", "must be > 0"));
    }
    if config.confirmation.timeout_secs == 0 {
        errors.push(ValidationError::new("confirmation.timeout_secs", "must be > 0"));
    }

    if config.transaction.validity_window == 0 || config.transaction.validity_window > 1000 {
        errors.push(ValidationError::new(
            "transaction.validity_window",
            "must be between 1 and 1000 rounds",
        ));
    }
    if config.transaction.max_note_bytes > 1024 {
        errors.push(ValidationError::new(
            "transaction.max_note_bytes",
            "the ledger accepts at most 1024 note bytes",
        ));
    }

    // A transfer fetches params and submits before it starts waiting.
    let transfer_budget = config
        .confirmation
        .timeout_secs
        .saturating_add(config.node.request_timeout_secs.saturating_mul(2));
    if config.timeouts.request_secs <= transfer_budget {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            format!(
                "must exceed confirmation.timeout_secs + 2 * node.request_timeout_secs ({transfer_budget})"
            ),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
