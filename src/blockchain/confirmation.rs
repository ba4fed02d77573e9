//! Submission and bounded confirmation polling.
//!
//! # State machine
//! ```text
//! Submitted ──> Pending ──┬──> Confirmed(round)
//!                  ^      ├──> Rejected(reason)
//!                  │      └──> TimedOut        (round or time budget spent)
//!                  └── wait one round
//! ```
//!
//! Each request owns its poll loop. Waiting suspends only the calling task.
//! Nothing is resubmitted: a timed-out transaction may still confirm later.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, timeout};

use crate::blockchain::client::NodeClient;
use crate::blockchain::transaction::SignedTransaction;
use crate::blockchain::types::{ConfirmationOutcome, NodeError, WaitBudget};
use crate::config::{ConfirmationConfig, WaitStrategy};
use crate::observability::metrics;

/// Errors raised while submitting or polling.
#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Node(#[from] NodeError),

    /// The node reported a different id than the one computed locally.
    #[error("node returned tx id {actual}, expected {expected}")]
    TxIdMismatch { expected: String, actual: String },
}

/// Submits signed transactions and waits for a terminal outcome.
pub struct ConfirmationPoller {
    client: Arc<dyn NodeClient>,
    max_rounds: u64,
    strategy: WaitStrategy,
    poll_interval: Duration,
    timeout: Duration,
}

impl ConfirmationPoller {
    pub fn new(client: Arc<dyn NodeClient>, config: &ConfirmationConfig) -> Self {
        Self {
            client,
            max_rounds: config.max_rounds_to_wait,
            strategy: config.wait_strategy,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Submit a signed transaction and return the id to poll with.
    pub async fn submit(&self, signed: &SignedTransaction) -> Result<String, PollError> {
        let tx_id = self.client.submit(signed.raw_bytes()).await?;
        if tx_id != signed.tx_id() {
            tracing::error!(
                expected = %signed.tx_id(),
                actual = %tx_id,
                "Node acknowledged a different transaction id"
            );
            return Err(PollError::TxIdMismatch {
                expected: signed.tx_id().to_string(),
                actual: tx_id,
            });
        }

        tracing::info!(tx_id = %tx_id, "Transaction submitted");
        Ok(tx_id)
    }

    /// Poll until the transaction is confirmed, rejected, or the budget
    /// runs out.
    pub async fn wait_for_confirmation(
        &self,
        tx_id: &str,
    ) -> Result<ConfirmationOutcome, PollError> {
        let outcome = match timeout(self.timeout, self.poll(tx_id)).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(
                    tx_id = %tx_id,
                    timeout_secs = self.timeout.as_secs(),
                    "Confirmation wait exceeded its time budget"
                );
                ConfirmationOutcome::TimedOut(WaitBudget::Seconds(self.timeout.as_secs()))
            }
        };

        metrics::record_transaction(outcome.label());
        Ok(outcome)
    }

    async fn poll(&self, tx_id: &str) -> Result<ConfirmationOutcome, PollError> {
        let start_round = self.client.current_round().await? + 1;
        let last_round = start_round + self.max_rounds;
        let mut current_round = start_round;

        while current_round < last_round {
            let pending = self.client.pending_info(tx_id).await?;
            let iterations = current_round - start_round + 1;

            if let Some(round) = pending.confirmed() {
                tracing::info!(tx_id = %tx_id, round, "Transaction confirmed");
                metrics::record_confirmation_rounds(iterations);
                return Ok(ConfirmationOutcome::Confirmed(round));
            }
            if let Some(reason) = pending.rejection() {
                tracing::warn!(tx_id = %tx_id, reason = %reason, "Transaction rejected by pool");
                metrics::record_confirmation_rounds(iterations);
                return Ok(ConfirmationOutcome::Rejected(reason.to_string()));
            }

            tracing::debug!(tx_id = %tx_id, round = current_round, "Transaction pending");
            match self.strategy {
                WaitStrategy::NodeRound => {
                    self.client.wait_for_round(current_round).await?;
                }
                WaitStrategy::FixedInterval => sleep(self.poll_interval).await,
            }
            current_round += 1;
        }

        tracing::warn!(
            tx_id = %tx_id,
            rounds = self.max_rounds,
            "Transaction still pending after round budget"
        );
        metrics::record_confirmation_rounds(self.max_rounds);
        Ok(ConfirmationOutcome::TimedOut(WaitBudget::Rounds(self.max_rounds)))
    }
}
