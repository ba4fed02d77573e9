//! `POST /api/transfer`: sign, submit and wait for a payment.
//!
//! Input is validated and the sender authorized before the node is
//! contacted. Once the node has accepted the transaction every outcome
//! carries its `tx_id`, and a failure while polling is reported as pending
//! rather than as an error, since the transaction may still confirm.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blockchain::{Address, ConfirmationOutcome, Credential, TransferRequest};
use crate::error::{GatewayError, GatewayResult};
use crate::http::server::AppState;

#[derive(Deserialize)]
pub struct TransferBody {
    pub from: Option<String>,
    pub mnemonic: Option<String>,
    pub to: Option<String>,
    /// Integer microAlgos, as a JSON number or a decimal string.
    pub amount: Option<Value>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub tx_id: String,
    pub status: &'static str,
}

/// Parse a positive integer amount.
pub fn parse_amount(value: &Value) -> Option<u64> {
    let amount = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    amount.filter(|a| *a > 0)
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|f| !f.is_empty())
}

pub async fn transfer(
    State(state): State<AppState>,
    body: Result<Json<TransferBody>, JsonRejection>,
) -> GatewayResult<Json<TransferResponse>> {
    let Json(body) = body.map_err(|e| GatewayError::validation(e.body_text()))?;
    let (Some(from), Some(mnemonic), Some(to), Some(amount)) = (
        non_empty(body.from),
        non_empty(body.mnemonic),
        non_empty(body.to),
        body.amount,
    ) else {
        return Err(GatewayError::validation("Missing required fields"));
    };

    let amount = parse_amount(&amount).ok_or_else(|| GatewayError::validation("Invalid amount"))?;

    let sender: Address = from
        .parse()
        .map_err(|_| GatewayError::validation("Invalid address"))?;
    let receiver: Address = to
        .parse()
        .map_err(|_| GatewayError::validation("Invalid address"))?;

    let credential = Credential::derive(&mnemonic)?;
    if !credential.matches(&from) {
        return Err(GatewayError::authorization(
            "Invalid mnemonic for sender address",
        ));
    }

    let request = TransferRequest {
        sender,
        credential,
        receiver,
        amount,
        note: body.note.unwrap_or_default().into_bytes(),
    };
    state.builder.check(&request)?;

    let signed = state.builder.build(&request).await?;
    let tx_id = state.poller.submit(&signed).await?;

    match state.poller.wait_for_confirmation(&tx_id).await {
        Ok(ConfirmationOutcome::Confirmed(_)) => Ok(Json(TransferResponse {
            tx_id,
            status: "confirmed",
        })),
        Ok(ConfirmationOutcome::Rejected(reason)) => Err(GatewayError::Rejected { tx_id, reason }),
        Ok(ConfirmationOutcome::TimedOut(budget)) => Err(GatewayError::TimedOut {
            reason: format!("Transaction not confirmed {budget}"),
            tx_id,
        }),
        Err(e) => {
            tracing::warn!(tx_id = %tx_id, error = %e, "Lost track of submitted transaction");
            Err(GatewayError::TimedOut {
                tx_id,
                reason: e.to_string(),
            })
        }
    }
}
