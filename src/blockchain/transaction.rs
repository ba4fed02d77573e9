//! Payment transaction building and signing.
//!
//! # Responsibilities
//! - Validate transfer inputs (amount, note size, sender key)
//! - Fetch suggested params and derive fee and validity window
//! - Encode the canonical transaction body and sign it
//! - Compute the transaction id the poller uses as its key

use std::sync::Arc;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::client::NodeClient;
use crate::blockchain::encoding::{self, Address, TX_PREFIX};
use crate::blockchain::types::{NodeError, SuggestedParams};
use crate::blockchain::wallet::Credential;
use crate::config::TransactionConfig;

const PAYMENT_TYPE: &str = "pay";
const SIGNATURE_LEN: usize = 64;

/// Errors raised while building or decoding a transaction.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Note too long: {len} bytes exceeds {max}")]
    NoteTooLarge { len: usize, max: usize },

    #[error("signing key does not control the sender address")]
    SenderMismatch,

    #[error("transaction encoding failed: {0}")]
    Encoding(String),

    #[error("transaction signature does not verify")]
    InvalidSignature,

    #[error(transparent)]
    Node(#[from] NodeError),
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

fn is_zero_address(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b == 0)
}

// Keys are declared in sorted order so named msgpack output is canonical.
#[derive(Debug, Serialize, Deserialize)]
struct WirePayment {
    #[serde(default, skip_serializing_if = "is_zero")]
    amt: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    fee: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    fv: u64,
    #[serde(rename = "gen", default, skip_serializing_if = "String::is_empty")]
    genesis_id: String,
    #[serde(with = "serde_bytes")]
    gh: Vec<u8>,
    #[serde(default, skip_serializing_if = "is_zero")]
    lv: u64,
    #[serde(with = "serde_bytes", default, skip_serializing_if = "Vec::is_empty")]
    note: Vec<u8>,
    #[serde(with = "serde_bytes", default, skip_serializing_if = "is_zero_address")]
    rcv: Vec<u8>,
    #[serde(with = "serde_bytes")]
    snd: Vec<u8>,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireSigned {
    #[serde(with = "serde_bytes")]
    sig: Vec<u8>,
    txn: WirePayment,
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, BuildError> {
    rmp_serde::to_vec_named(value).map_err(|e| BuildError::Encoding(e.to_string()))
}

fn fixed<const N: usize>(field: &str, bytes: &[u8]) -> Result<[u8; N], BuildError> {
    bytes
        .try_into()
        .map_err(|_| BuildError::Encoding(format!("{field} must be {N} bytes, got {}", bytes.len())))
}

/// An unsigned payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTransaction {
    pub sender: Address,
    pub receiver: Address,
    /// Amount in microAlgos.
    pub amount: u64,
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
    pub note: Vec<u8>,
}

impl PaymentTransaction {
    /// Assemble a payment from node params, with the fee sized to the
    /// encoded signed transaction.
    pub fn new(
        sender: Address,
        receiver: Address,
        amount: u64,
        note: Vec<u8>,
        params: &SuggestedParams,
        validity_window: u64,
    ) -> Result<Self, BuildError> {
        if amount == 0 {
            return Err(BuildError::InvalidAmount);
        }

        let mut txn = Self {
            sender,
            receiver,
            amount,
            fee: 0,
            first_valid: params.first_valid,
            last_valid: params.first_valid.saturating_add(validity_window),
            genesis_id: params.genesis_id.clone(),
            genesis_hash: params.genesis_hash,
            note,
        };

        let estimated_size = txn.estimated_signed_size()? as u64;
        txn.fee = params
            .fee_per_byte
            .saturating_mul(estimated_size)
            .max(params.min_fee);
        Ok(txn)
    }

    fn to_wire(&self) -> WirePayment {
        WirePayment {
            amt: self.amount,
            fee: self.fee,
            fv: self.first_valid,
            genesis_id: self.genesis_id.clone(),
            gh: self.genesis_hash.to_vec(),
            lv: self.last_valid,
            note: self.note.clone(),
            rcv: self.receiver.as_bytes().to_vec(),
            snd: self.sender.as_bytes().to_vec(),
            kind: PAYMENT_TYPE.to_string(),
        }
    }

    fn from_wire(wire: WirePayment) -> Result<Self, BuildError> {
        if wire.kind != PAYMENT_TYPE {
            return Err(BuildError::Encoding(format!(
                "unsupported transaction type '{}'",
                wire.kind
            )));
        }
        let receiver = if wire.rcv.is_empty() {
            Address::ZERO
        } else {
            Address::from_public_key(fixed("rcv", &wire.rcv)?)
        };
        Ok(Self {
            sender: Address::from_public_key(fixed("snd", &wire.snd)?),
            receiver,
            amount: wire.amt,
            fee: wire.fee,
            first_valid: wire.fv,
            last_valid: wire.lv,
            genesis_id: wire.genesis_id,
            genesis_hash: fixed("gh", &wire.gh)?,
            note: wire.note,
        })
    }

    /// Canonical msgpack encoding of the transaction body.
    pub fn encode(&self) -> Result<Vec<u8>, BuildError> {
        encode(&self.to_wire())
    }

    /// Transaction id of this body.
    pub fn id(&self) -> Result<String, BuildError> {
        Ok(encoding::transaction_id(&self.encode()?))
    }

    fn estimated_signed_size(&self) -> Result<usize, BuildError> {
        let placeholder = WireSigned {
            sig: vec![0; SIGNATURE_LEN],
            txn: self.to_wire(),
        };
        Ok(encode(&placeholder)?.len())
    }

    /// Sign with `key`, which must control the sender address.
    pub fn sign(&self, key: &SigningKey) -> Result<SignedTransaction, BuildError> {
        if Address::from_public_key(key.verifying_key().to_bytes()) != self.sender {
            return Err(BuildError::SenderMismatch);
        }

        let body = self.encode()?;
        let mut message = Vec::with_capacity(TX_PREFIX.len() + body.len());
        message.extend_from_slice(TX_PREFIX);
        message.extend_from_slice(&body);
        let signature = key.sign(&message);

        let raw_bytes = encode(&WireSigned {
            sig: signature.to_bytes().to_vec(),
            txn: self.to_wire(),
        })?;

        Ok(SignedTransaction {
            raw_bytes,
            tx_id: encoding::transaction_id(&body),
        })
    }
}

/// An encoded, signed transaction ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    raw_bytes: Vec<u8>,
    tx_id: String,
}

impl SignedTransaction {
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    /// Parse a signed transaction, verify its signature and recompute its id.
    pub fn decode(raw: &[u8]) -> Result<(Self, PaymentTransaction), BuildError> {
        let wire: WireSigned =
            rmp_serde::from_slice(raw).map_err(|e| BuildError::Encoding(e.to_string()))?;
        let signature = Signature::from_bytes(&fixed::<SIGNATURE_LEN>("sig", &wire.sig)?);
        let payment = PaymentTransaction::from_wire(wire.txn)?;

        let body = payment.encode()?;
        let mut message = Vec::with_capacity(TX_PREFIX.len() + body.len());
        message.extend_from_slice(TX_PREFIX);
        message.extend_from_slice(&body);

        let verifying_key = VerifyingKey::from_bytes(payment.sender.as_bytes())
            .map_err(|_| BuildError::InvalidSignature)?;
        verifying_key
            .verify(&message, &signature)
            .map_err(|_| BuildError::InvalidSignature)?;

        let signed = Self {
            raw_bytes: raw.to_vec(),
            tx_id: encoding::transaction_id(&body),
        };
        Ok((signed, payment))
    }
}

/// Build and sign a payment in one step.
pub fn build_and_sign(
    sender: &Address,
    key: &SigningKey,
    receiver: &Address,
    amount: u64,
    note: &[u8],
    params: &SuggestedParams,
    validity_window: u64,
) -> Result<SignedTransaction, BuildError> {
    PaymentTransaction::new(
        *sender,
        *receiver,
        amount,
        note.to_vec(),
        params,
        validity_window,
    )?
    .sign(key)
}

/// A validated transfer, holding the sender's credential for one request.
#[derive(Debug)]
pub struct TransferRequest {
    pub sender: Address,
    pub credential: Credential,
    pub receiver: Address,
    pub amount: u64,
    pub note: Vec<u8>,
}

/// Builds signed payments against live node parameters.
pub struct TxBuilder {
    client: Arc<dyn NodeClient>,
    validity_window: u64,
    max_note_bytes: usize,
}

impl TxBuilder {
    /// Create a new transaction builder.
    pub fn new(client: Arc<dyn NodeClient>, config: &TransactionConfig) -> Self {
        Self {
            client,
            validity_window: config.validity_window,
            max_note_bytes: config.max_note_bytes,
        }
    }

    /// Check a transfer without touching the node.
    pub fn check(&self, request: &TransferRequest) -> Result<(), BuildError> {
        if request.amount == 0 {
            return Err(BuildError::InvalidAmount);
        }
        if request.note.len() > self.max_note_bytes {
            return Err(BuildError::NoteTooLarge {
                len: request.note.len(),
                max: self.max_note_bytes,
            });
        }
        if *request.credential.address() != request.sender {
            return Err(BuildError::SenderMismatch);
        }
        Ok(())
    }

    /// Build and sign a transfer. The params fetch is the only node call.
    pub async fn build(&self, request: &TransferRequest) -> Result<SignedTransaction, BuildError> {
        self.check(request)?;

        let params = self.client.suggested_params().await?;
        let signed = build_and_sign(
            &request.sender,
            request.credential.signing_key(),
            &request.receiver,
            request.amount,
            &request.note,
            &params,
            self.validity_window,
        )?;

        tracing::debug!(
            tx_id = %signed.tx_id(),
            sender = %request.sender,
            receiver = %request.receiver,
            amount = request.amount,
            first_valid = params.first_valid,
            "Transaction signed"
        );
        Ok(signed)
    }
}
