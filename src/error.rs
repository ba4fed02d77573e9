//! Gateway error taxonomy and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::blockchain::{BuildError, InvalidCredential, NodeError, PollError};

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Every way a gateway request can end other than plain success.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed or missing caller input.
    #[error("{0}")]
    Validation(String),

    /// The recovery phrase does not control the claimed address.
    #[error("{0}")]
    Authorization(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    /// The node could not be reached or answered unexpectedly.
    #[error("node unavailable: {0}")]
    NodeUnavailable(#[from] NodeError),

    /// The transaction pool refused the transaction.
    #[error("transaction {tx_id} rejected: {reason}")]
    Rejected { tx_id: String, reason: String },

    /// Submitted but not confirmed within the wait budget.
    #[error("transaction {tx_id} still pending: {reason}")]
    TimedOut { tx_id: String, reason: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        GatewayError::Validation(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        GatewayError::Authorization(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Authorization(_) => StatusCode::FORBIDDEN,
            GatewayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Rejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::TimedOut { .. } => StatusCode::ACCEPTED,
            GatewayError::NodeUnavailable(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn log(&self) {
        match self {
            GatewayError::NodeUnavailable(e) => {
                tracing::error!(operation = e.operation(), error = %e, "Node unavailable")
            }
            GatewayError::Internal(msg) => tracing::error!(error = %msg, "Internal error"),
            GatewayError::Rejected { tx_id, reason } => {
                tracing::warn!(tx_id = %tx_id, reason = %reason, "Transfer rejected")
            }
            GatewayError::TimedOut { tx_id, reason } => {
                tracing::info!(tx_id = %tx_id, reason = %reason, "Transfer still pending")
            }
            other => tracing::debug!(error = %other, "Request refused"),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();

        let body = match self {
            GatewayError::Validation(msg) | GatewayError::Authorization(msg) => {
                json!({ "error": msg })
            }
            GatewayError::RateLimited => json!({ "error": "Rate limit exceeded" }),
            GatewayError::NodeUnavailable(_) => json!({ "error": "Blockchain node unavailable" }),
            GatewayError::Internal(_) => json!({ "error": "Internal server error" }),
            GatewayError::Rejected { tx_id, reason } => {
                json!({ "tx_id": tx_id, "status": "rejected", "error": reason })
            }
            GatewayError::TimedOut { tx_id, reason } => {
                json!({ "tx_id": tx_id, "status": "pending", "error": reason })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<InvalidCredential> for GatewayError {
    fn from(_: InvalidCredential) -> Self {
        GatewayError::validation("Invalid mnemonic")
    }
}

impl From<BuildError> for GatewayError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::InvalidAmount => GatewayError::validation("Invalid amount"),
            BuildError::NoteTooLarge { max, .. } => {
                GatewayError::validation(format!("Note too long (max {max} bytes)"))
            }
            BuildError::SenderMismatch => {
                GatewayError::authorization("Invalid mnemonic for sender address")
            }
            BuildError::Node(e) => GatewayError::NodeUnavailable(e),
            other @ (BuildError::Encoding(_) | BuildError::InvalidSignature) => {
                GatewayError::Internal(other.to_string())
            }
        }
    }
}

impl From<PollError> for GatewayError {
    fn from(err: PollError) -> Self {
        match err {
            PollError::Node(e) => GatewayError::NodeUnavailable(e),
            mismatch @ PollError::TxIdMismatch { .. } => GatewayError::Internal(mismatch.to_string()),
        }
    }
}
