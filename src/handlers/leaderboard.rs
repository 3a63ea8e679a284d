use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
};
use serde_json::{Value, json};

use crate::error::LeaderboardError;
use crate::models::{ListParams, SignRequest, SignedScore};
use crate::signature::now_ms;
use crate::state::SharedState;

// First hop of x-forwarded-for, the original client behind the proxy
fn client_identifier(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

// POST /leaderboard
pub async fn submit_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), LeaderboardError> {
    let client = client_identifier(&headers);
    let stored = state.gate.submit(&client, &body, now_ms()).await?;

    Ok((StatusCode::CREATED, Json(json!({ "success": true, "data": stored }))))
}

// GET /leaderboard?game_id=&limit=
pub async fn list_handler(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, LeaderboardError> {
    let rows = state.gate.leaderboard(&params.into_query()).await?;
    Ok(Json(json!({ "data": rows })))
}

// POST /leaderboard/sign
pub async fn sign_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<SignedScore>, LeaderboardError> {
    let request: SignRequest =
        serde_json::from_slice(&body).map_err(|_| LeaderboardError::InvalidSignRequest)?;
    Ok(Json(state.gate.issue(request, now_ms())?))
}
