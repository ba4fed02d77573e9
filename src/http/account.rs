//! Account endpoints.
//!
//! - `POST /api/account/new`: generate a fresh account
//! - `POST /api/account/balance`: balance lookup, authenticated by mnemonic

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::blockchain::{wallet, Address};
use crate::error::{GatewayError, GatewayResult};
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct NewAccountResponse {
    pub address: String,
    pub mnemonic: String,
}

pub async fn create_account() -> Json<NewAccountResponse> {
    let credential = wallet::Credential::generate();
    tracing::info!(address = %credential.address(), "Account created");

    Json(NewAccountResponse {
        address: credential.address().to_string(),
        mnemonic: credential.recovery_phrase().to_string(),
    })
}

#[derive(Deserialize)]
pub struct BalanceRequest {
    pub address: Option<String>,
    pub mnemonic: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub address: String,
    pub balance: u64,
    pub status: &'static str,
}

pub async fn balance(
    State(state): State<AppState>,
    body: Result<Json<BalanceRequest>, JsonRejection>,
) -> GatewayResult<Json<BalanceResponse>> {
    let Json(request) = body.map_err(|e| GatewayError::validation(e.body_text()))?;
    let (Some(address), Some(mnemonic)) = (
        request.address.filter(|a| !a.is_empty()),
        request.mnemonic.filter(|m| !m.is_empty()),
    ) else {
        return Err(GatewayError::validation("Missing address or mnemonic"));
    };

    let parsed: Address = address
        .parse()
        .map_err(|_| GatewayError::validation("Invalid address"))?;

    let key = wallet::derive(&mnemonic)?;
    if !wallet::matches(&key, &address) {
        return Err(GatewayError::authorization("Invalid mnemonic for address"));
    }

    let info = state.node.account_info(&parsed).await?;
    Ok(Json(BalanceResponse {
        address: parsed.to_string(),
        balance: info.amount,
        status: if info.is_online() { "active" } else { "offline" },
    }))
}
