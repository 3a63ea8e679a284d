use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::store::StoreError;

/// Every way a leaderboard request can fail.
///
/// `Display` is the message the caller sees. Storage and unexpected failures
/// keep their cause for the logs only.
#[derive(Error, Debug)]
pub enum LeaderboardError {
    #[error("Too many requests. Please wait a moment.")]
    RateLimited,

    #[error("Missing required fields: name, score, game_id, signature, timestamp")]
    MalformedRequest,

    #[error("Missing required fields: score, game_id")]
    InvalidSignRequest,

    #[error("Invalid score signature")]
    InvalidSignature,

    #[error("Invalid score range")]
    OutOfRange,

    #[error("Failed to save score")]
    StorageFailure(#[source] StoreError),

    #[error("Failed to fetch leaderboard")]
    FetchFailure(#[source] StoreError),

    #[error("Internal Server Error")]
    UnexpectedFailure(String),
}

impl LeaderboardError {
    pub fn status(&self) -> StatusCode {
        match self {
            LeaderboardError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            LeaderboardError::MalformedRequest | LeaderboardError::InvalidSignRequest => {
                StatusCode::BAD_REQUEST
            }
            LeaderboardError::InvalidSignature => StatusCode::FORBIDDEN,
            LeaderboardError::OutOfRange => StatusCode::BAD_REQUEST,
            LeaderboardError::StorageFailure(_)
            | LeaderboardError::FetchFailure(_)
            | LeaderboardError::UnexpectedFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Metric label
    pub fn reason(&self) -> &'static str {
        match self {
            LeaderboardError::RateLimited => "rate_limited",
            LeaderboardError::MalformedRequest | LeaderboardError::InvalidSignRequest => {
                "malformed"
            }
            LeaderboardError::InvalidSignature => "invalid_signature",
            LeaderboardError::OutOfRange => "out_of_range",
            LeaderboardError::StorageFailure(_) | LeaderboardError::FetchFailure(_) => "storage",
            LeaderboardError::UnexpectedFailure(_) => "unexpected",
        }
    }
}

impl IntoResponse for LeaderboardError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
