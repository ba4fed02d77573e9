//! Node-facing types and error definitions.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export NodeConfig from config module to avoid duplication
pub use crate::config::schema::NodeConfig;

/// Errors that can occur while talking to the node.
///
/// The gateway treats every variant as "node unavailable"; the variants
/// only make logs more useful.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Connection refused, reset, DNS failure.
    #[error("transport error during {operation}: {reason}")]
    Transport {
        operation: &'static str,
        reason: String,
    },

    /// Request timed out.
    #[error("{operation} timed out after {secs} seconds")]
    Timeout { operation: &'static str, secs: u64 },

    /// The node answered with a non-success status.
    #[error("{operation} returned HTTP {status}: {message}")]
    Status {
        operation: &'static str,
        status: u16,
        message: String,
    },

    /// The node's answer did not have the expected shape.
    #[error("unexpected response to {operation}: {reason}")]
    Decode {
        operation: &'static str,
        reason: String,
    },
}

impl NodeError {
    /// The node operation that failed.
    pub fn operation(&self) -> &'static str {
        match self {
            NodeError::Transport { operation, .. }
            | NodeError::Timeout { operation, .. }
            | NodeError::Status { operation, .. }
            | NodeError::Decode { operation, .. } => operation,
        }
    }
}

/// Result type for node operations.
pub type NodeResult<T> = Result<T, NodeError>;

/// Node status (`GET /v2/status`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NodeStatus {
    #[serde(rename = "last-round")]
    pub last_round: u64,
    /// Nanoseconds since the last round was produced.
    #[serde(rename = "time-since-last-round", default)]
    pub time_since_last_round: u64,
}

/// Account state (`GET /v2/accounts/{address}`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccountInfo {
    pub address: String,
    /// Balance in microAlgos.
    #[serde(default)]
    pub amount: u64,
    /// Participation status ("Online", "Offline", "NotParticipating").
    #[serde(default)]
    pub status: String,
}

impl AccountInfo {
    pub fn is_online(&self) -> bool {
        self.status == "Online"
    }
}

/// Wire shape of `GET /v2/transactions/params`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransactionParamsResponse {
    /// Suggested fee per byte.
    pub fee: u64,
    #[serde(rename = "min-fee")]
    pub min_fee: u64,
    #[serde(rename = "last-round")]
    pub last_round: u64,
    #[serde(rename = "genesis-id")]
    pub genesis_id: String,
    /// Base64 encoded genesis hash.
    #[serde(rename = "genesis-hash")]
    pub genesis_hash: String,
}

/// Network parameters needed to build a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedParams {
    pub fee_per_byte: u64,
    pub min_fee: u64,
    /// First round the transaction may be committed in.
    pub first_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
}

impl TryFrom<TransactionParamsResponse> for SuggestedParams {
    type Error = NodeError;

    fn try_from(raw: TransactionParamsResponse) -> Result<Self, Self::Error> {
        let decode_error = |reason: String| NodeError::Decode {
            operation: "suggested_params",
            reason,
        };

        let hash = STANDARD
            .decode(raw.genesis_hash.as_bytes())
            .map_err(|e| decode_error(format!("genesis hash is not base64: {e}")))?;
        let genesis_hash: [u8; 32] = hash
            .try_into()
            .map_err(|h: Vec<u8>| decode_error(format!("genesis hash has {} bytes", h.len())))?;

        Ok(Self {
            fee_per_byte: raw.fee,
            min_fee: raw.min_fee,
            first_valid: raw.last_round,
            genesis_id: raw.genesis_id,
            genesis_hash,
        })
    }
}

/// Pending transaction state (`GET /v2/transactions/pending/{txid}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PendingTransaction {
    /// Round the transaction was committed in, absent while pending.
    #[serde(rename = "confirmed-round", default)]
    pub confirmed_round: Option<u64>,
    /// Non-empty when the transaction pool evicted the transaction.
    #[serde(rename = "pool-error", default)]
    pub pool_error: String,
}

impl PendingTransaction {
    /// The confirmation round, if the transaction has been committed.
    pub fn confirmed(&self) -> Option<u64> {
        self.confirmed_round.filter(|round| *round > 0)
    }

    /// The pool rejection reason, if any.
    pub fn rejection(&self) -> Option<&str> {
        if self.pool_error.is_empty() {
            None
        } else {
            Some(&self.pool_error)
        }
    }
}

/// Terminal result of waiting for a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// Committed in the given round.
    Confirmed(u64),
    /// Evicted from the transaction pool.
    Rejected(String),
    /// Still pending when a wait budget ran out. It may confirm later.
    TimedOut(WaitBudget),
}

/// The budget that ended a confirmation wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitBudget {
    /// `max_rounds_to_wait` rounds were polled.
    Rounds(u64),
    /// The wall-clock limit, in seconds, expired first.
    Seconds(u64),
}

impl fmt::Display for WaitBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitBudget::Rounds(rounds) => write!(f, "after {rounds} rounds"),
            WaitBudget::Seconds(secs) => write!(f, "within {secs} seconds"),
        }
    }
}

impl ConfirmationOutcome {
    /// Metric label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            ConfirmationOutcome::Confirmed(_) => "confirmed",
            ConfirmationOutcome::Rejected(_) => "rejected",
            ConfirmationOutcome::TimedOut(_) => "timed_out",
        }
    }
}
