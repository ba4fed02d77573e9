//! `GET /health`: reports whether the node answers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct NodeStatusBody {
    pub last_round: u64,
    pub time_since_last_round: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub node_status: NodeStatusBody,
}

pub async fn health(State(state): State<AppState>) -> Response {
    match state.node.status().await {
        Ok(status) => Json(HealthResponse {
            status: "healthy",
            node_status: NodeStatusBody {
                last_round: status.last_round,
                time_since_last_round: status.time_since_last_round,
            },
        })
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
