//! Algorand node (algod v2 REST) client with timeout and error handling.
//!
//! # Responsibilities
//! - Query node state (status, accounts, suggested params, pending txns)
//! - Submit signed transactions
//! - Block until a given round has passed
//! - Handle timeouts and network errors uniformly as `NodeError`

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::time::timeout;

use crate::blockchain::encoding::Address;
use crate::blockchain::types::{
    AccountInfo, NodeConfig, NodeError, NodeResult, NodeStatus, PendingTransaction,
    SuggestedParams, TransactionParamsResponse,
};
use crate::observability::metrics;

/// Header carrying the algod API token.
pub const TOKEN_HEADER: &str = "X-Algo-API-Token";

/// The node operations the gateway depends on.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Current node status.
    async fn status(&self) -> NodeResult<NodeStatus>;

    /// Account balance and participation status.
    async fn account_info(&self, address: &Address) -> NodeResult<AccountInfo>;

    /// Fee and validity parameters for a new transaction.
    async fn suggested_params(&self) -> NodeResult<SuggestedParams>;

    /// Submit a signed, encoded transaction. Returns the node's tx id.
    async fn submit(&self, raw_bytes: &[u8]) -> NodeResult<String>;

    /// Pool/commit state of a submitted transaction.
    async fn pending_info(&self, tx_id: &str) -> NodeResult<PendingTransaction>;

    /// Wait until the node has seen a block after `round`.
    async fn wait_for_round(&self, round: u64) -> NodeResult<NodeStatus>;

    /// Latest round known to the node.
    async fn current_round(&self) -> NodeResult<u64> {
        Ok(self.status().await?.last_round)
    }
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(rename = "txId")]
    tx_id: String,
}

#[derive(Deserialize)]
struct NodeErrorBody {
    message: String,
}

/// algod REST client.
#[derive(Clone)]
pub struct AlgodClient {
    http: reqwest::Client,
    base_url: url::Url,
    request_timeout: Duration,
    wait_timeout: Duration,
}

impl AlgodClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `config` - Node configuration
    /// * `token` - algod API token (may be empty)
    pub fn new(config: &NodeConfig, token: &str) -> NodeResult<Self> {
        let base_url: url::Url = config.address.parse().map_err(|e| NodeError::Transport {
            operation: "connect",
            reason: format!("Invalid node URL '{}': {}", config.address, e),
        })?;

        let mut headers = HeaderMap::new();
        if !token.is_empty() {
            let mut value = HeaderValue::from_str(token).map_err(|_| NodeError::Transport {
                operation: "connect",
                reason: "node token contains invalid header characters".to_string(),
            })?;
            value.set_sensitive(true);
            headers.insert(TOKEN_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| NodeError::Transport {
                operation: "connect",
                reason: e.to_string(),
            })?;

        tracing::info!(node_address = %base_url, "Node client initialized");

        Ok(Self {
            http,
            base_url,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            wait_timeout: Duration::from_secs(config.wait_timeout_secs),
        })
    }

    /// Check if the node is reachable.
    pub async fn is_healthy(&self) -> bool {
        self.status().await.is_ok()
    }

    fn url(&self, operation: &'static str, path: &str) -> NodeResult<url::Url> {
        self.base_url.join(path).map_err(|e| NodeError::Transport {
            operation,
            reason: format!("cannot build URL for '{path}': {e}"),
        })
    }

    /// Run a request future under a timeout, normalizing every failure.
    async fn call<T, F>(&self, operation: &'static str, limit: Duration, fut: F) -> NodeResult<T>
    where
        T: DeserializeOwned,
        F: Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let exchange = async {
            let response = fut.await.map_err(|e| NodeError::Transport {
                operation,
                reason: e.to_string(),
            })?;
            decode(operation, response).await
        };

        let result = match timeout(limit, exchange).await {
            Ok(result) => result,
            Err(_) => Err(NodeError::Timeout {
                operation,
                secs: limit.as_secs(),
            }),
        };

        if let Err(e) = &result {
            tracing::warn!(operation, error = %e, "Node request failed");
            metrics::record_node_error(operation);
        }
        result
    }

    async fn get<T: DeserializeOwned>(&self, operation: &'static str, path: &str) -> NodeResult<T> {
        let url = self.url(operation, path)?;
        self.call(operation, self.request_timeout, self.http.get(url).send())
            .await
    }
}

async fn decode<T: DeserializeOwned>(
    operation: &'static str,
    response: reqwest::Response,
) -> NodeResult<T> {
    let status = response.status();
    let body = response.bytes().await.map_err(|e| NodeError::Transport {
        operation,
        reason: e.to_string(),
    })?;

    if !status.is_success() {
        let message = serde_json::from_slice::<NodeErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
        return Err(NodeError::Status {
            operation,
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&body).map_err(|e| NodeError::Decode {
        operation,
        reason: e.to_string(),
    })
}

#[async_trait]
impl NodeClient for AlgodClient {
    async fn status(&self) -> NodeResult<NodeStatus> {
        self.get("status", "v2/status").await
    }

    async fn account_info(&self, address: &Address) -> NodeResult<AccountInfo> {
        self.get("account_info", &format!("v2/accounts/{address}"))
            .await
    }

    async fn suggested_params(&self) -> NodeResult<SuggestedParams> {
        let raw: TransactionParamsResponse =
            self.get("suggested_params", "v2/transactions/params").await?;
        SuggestedParams::try_from(raw)
    }

    async fn submit(&self, raw_bytes: &[u8]) -> NodeResult<String> {
        let operation = "submit";
        let url = self.url(operation, "v2/transactions")?;
        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/x-binary")
            .body(raw_bytes.to_vec())
            .send();

        let response: SubmitResponse = self.call(operation, self.request_timeout, request).await?;
        Ok(response.tx_id)
    }

    async fn pending_info(&self, tx_id: &str) -> NodeResult<PendingTransaction> {
        self.get(
            "pending_info",
            &format!("v2/transactions/pending/{tx_id}?format=json"),
        )
        .await
    }

    async fn wait_for_round(&self, round: u64) -> NodeResult<NodeStatus> {
        let operation = "wait_for_round";
        let url = self.url(operation, &format!("v2/status/wait-for-block-after/{round}"))?;
        self.call(operation, self.wait_timeout, self.http.get(url).send())
            .await
    }
}

impl fmt::Debug for AlgodClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgodClient")
            .field("base_url", &self.base_url.as_str())
            .field("request_timeout_secs", &self.request_timeout.as_secs())
            .field("wait_timeout_secs", &self.wait_timeout.as_secs())
            .finish()
    }
}
