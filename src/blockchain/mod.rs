//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! recovery phrase
//!     → mnemonic.rs / wallet.rs (key derivation, address check)
//!     → transaction.rs (params fetch, build, sign, tx id)
//!     → confirmation.rs (submit, bounded round polling)
//!     → client.rs (algod REST with timeouts)
//! ```
//!
//! # Security Constraints
//! - Keys exist only for one request and are never persisted
//! - Never log recovery phrases or keys
//! - All node calls have configurable timeouts
//! - Node failures surface as errors, never panics

pub mod client;
pub mod confirmation;
pub mod encoding;
pub mod mnemonic;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{AlgodClient, NodeClient};
pub use confirmation::{ConfirmationPoller, PollError};
pub use encoding::{Address, AddressError};
pub use transaction::{BuildError, SignedTransaction, TransferRequest, TxBuilder};
pub use types::{ConfirmationOutcome, NodeError, NodeResult, WaitBudget};
pub use wallet::{Credential, InvalidCredential};
