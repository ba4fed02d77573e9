//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use algod_gateway::blockchain::mnemonic;
use algod_gateway::blockchain::transaction::{PaymentTransaction, SignedTransaction};
use algod_gateway::blockchain::types::{
    AccountInfo, NodeResult, NodeStatus, PendingTransaction, SuggestedParams,
};
use algod_gateway::blockchain::{Address, Credential, NodeClient, NodeError};
use algod_gateway::{build_router, AppState, GatewayConfig};

/// What the mock node does with a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Commit on the first poll.
    Confirm,
    /// Commit only after this many pending polls.
    ConfirmAfter(usize),
    /// Evict from the pool with the given reason.
    Reject(String),
    /// Stay pending forever.
    Never,
}

#[derive(Default)]
struct Ledger {
    round: u64,
    balances: HashMap<Address, u64>,
    online: HashMap<Address, bool>,
    pending: HashMap<String, (PaymentTransaction, usize)>,
    confirmed: HashMap<String, u64>,
}

/// In-memory node: verifies signatures, tracks balances, advances rounds.
pub struct MockNode {
    ledger: Mutex<Ledger>,
    settlement: Mutex<Settlement>,
    down: AtomicBool,
    /// Every call to any node operation.
    pub calls: AtomicUsize,
    pub submits: AtomicUsize,
    pub polls: AtomicUsize,
}

impl MockNode {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            ledger: Mutex::new(Ledger {
                round: 1000,
                ..Default::default()
            }),
            settlement: Mutex::new(Settlement::Confirm),
            down: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            submits: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
        })
    }

    pub fn set_settlement(&self, settlement: Settlement) {
        *self.settlement.lock().unwrap() = settlement;
    }

    /// Make every subsequent call fail.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn fund(&self, address: &Address, amount: u64) {
        *self
            .ledger
            .lock()
            .unwrap()
            .balances
            .entry(*address)
            .or_default() += amount;
    }

    pub fn set_online(&self, address: &Address) {
        self.ledger.lock().unwrap().online.insert(*address, true);
    }

    pub fn balance(&self, address: &Address) -> u64 {
        self.ledger
            .lock()
            .unwrap()
            .balances
            .get(address)
            .copied()
            .unwrap_or(0)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self, operation: &'static str) -> NodeResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(NodeError::Transport {
                operation,
                reason: "connection refused".into(),
            });
        }
        Ok(())
    }
}

fn rejected(operation: &'static str, message: String) -> NodeError {
    NodeError::Status {
        operation,
        status: 400,
        message,
    }
}

#[async_trait]
impl NodeClient for MockNode {
    async fn status(&self) -> NodeResult<NodeStatus> {
        self.enter("status")?;
        Ok(NodeStatus {
            last_round: self.ledger.lock().unwrap().round,
            time_since_last_round: 1_500_000_000,
        })
    }

    async fn account_info(&self, address: &Address) -> NodeResult<AccountInfo> {
        self.enter("account_info")?;
        let ledger = self.ledger.lock().unwrap();
        let online = ledger.online.get(address).copied().unwrap_or(false);
        Ok(AccountInfo {
            address: address.to_string(),
            amount: ledger.balances.get(address).copied().unwrap_or(0),
            status: if online { "Online" } else { "Offline" }.to_string(),
        })
    }

    async fn suggested_params(&self) -> NodeResult<SuggestedParams> {
        self.enter("suggested_params")?;
        Ok(SuggestedParams {
            fee_per_byte: 0,
            min_fee: 1000,
            first_valid: self.ledger.lock().unwrap().round,
            genesis_id: "mocknet-v1".into(),
            genesis_hash: [7; 32],
        })
    }

    async fn submit(&self, raw_bytes: &[u8]) -> NodeResult<String> {
        self.enter("submit")?;
        self.submits.fetch_add(1, Ordering::SeqCst);

        let (signed, payment) = SignedTransaction::decode(raw_bytes)
            .map_err(|e| rejected("submit", e.to_string()))?;

        let mut ledger = self.ledger.lock().unwrap();
        let available = ledger.balances.get(&payment.sender).copied().unwrap_or(0);
        if available < payment.amount + payment.fee {
            return Err(rejected("submit", "overspend".into()));
        }
        ledger
            .pending
            .insert(signed.tx_id().to_string(), (payment, 0));
        Ok(signed.tx_id().to_string())
    }

    async fn pending_info(&self, tx_id: &str) -> NodeResult<PendingTransaction> {
        self.enter("pending_info")?;
        self.polls.fetch_add(1, Ordering::SeqCst);

        let settlement = self.settlement.lock().unwrap().clone();
        let mut ledger = self.ledger.lock().unwrap();

        if let Some(round) = ledger.confirmed.get(tx_id) {
            return Ok(PendingTransaction {
                confirmed_round: Some(*round),
                pool_error: String::new(),
            });
        }

        let Some((payment, seen)) = ledger.pending.get_mut(tx_id) else {
            return Err(rejected("pending_info", "unknown transaction".into()));
        };
        *seen += 1;
        let seen = *seen;
        let payment = payment.clone();

        let commit = match &settlement {
            Settlement::Confirm => true,
            Settlement::ConfirmAfter(polls) => seen > *polls,
            Settlement::Reject(reason) => {
                ledger.pending.remove(tx_id);
                return Ok(PendingTransaction {
                    confirmed_round: None,
                    pool_error: reason.clone(),
                });
            }
            Settlement::Never => false,
        };

        if !commit {
            return Ok(PendingTransaction::default());
        }

        ledger.pending.remove(tx_id);
        ledger.round += 1;
        let round = ledger.round;
        *ledger.balances.entry(payment.sender).or_default() -= payment.amount + payment.fee;
        *ledger.balances.entry(payment.receiver).or_default() += payment.amount;
        ledger.confirmed.insert(tx_id.to_string(), round);

        Ok(PendingTransaction {
            confirmed_round: Some(round),
            pool_error: String::new(),
        })
    }

    async fn wait_for_round(&self, round: u64) -> NodeResult<NodeStatus> {
        self.enter("wait_for_round")?;
        let mut ledger = self.ledger.lock().unwrap();
        ledger.round = ledger.round.max(round + 1);
        Ok(NodeStatus {
            last_round: ledger.round,
            time_since_last_round: 0,
        })
    }
}

/// A deterministic account derived from `seed`.
pub fn account(seed: u8) -> Credential {
    Credential::derive(&mnemonic::from_key(&[seed; 32])).unwrap()
}

/// Gateway router over `node` with default configuration.
pub fn gateway(node: Arc<MockNode>) -> Router {
    gateway_with(GatewayConfig::default(), node)
}

pub fn gateway_with(config: GatewayConfig, node: Arc<MockNode>) -> Router {
    let state = AppState::new(node, &config);
    build_router(&config, state)
}

/// Send a request as if it came from `peer`, returning status and JSON body.
pub async fn call_from(
    app: &Router,
    peer: SocketAddr,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let mut request = builder.body(body).unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn call(
    app: &Router,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    call_from(app, "127.0.0.1:40000".parse().unwrap(), method, path, body).await
}
