//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, NodeConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Resolve the algod API token.
///
/// An inline `token` wins. Otherwise the token file is read and trimmed; a
/// missing or unreadable file yields an empty token, which a node without
/// authentication accepts.
pub fn load_node_token(config: &NodeConfig) -> String {
    if let Some(token) = &config.token {
        return token.trim().to_string();
    }

    match fs::read_to_string(&config.token_path) {
        Ok(token) => token.trim().to_string(),
        Err(e) => {
            tracing::warn!(
                token_path = %config.token_path,
                error = %e,
                "Node token file unavailable, continuing without a token"
            );
            String::new()
        }
    }
}
