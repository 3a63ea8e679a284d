//! Leaderboard storage collaborator.
//!
//! The gate only sees [`LeaderboardStore`]. Ordering, filtering and limits
//! are the store's job.

mod memory;
mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{LeaderboardQuery, LeaderboardRecord, NewEntry};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("request to store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    /// Persists one entry and returns the stored rows.
    async fn insert(&self, entry: NewEntry) -> Result<Vec<LeaderboardRecord>, StoreError>;

    /// Highest scores first, optionally for one game, at most `query.limit` rows.
    async fn query(&self, query: &LeaderboardQuery) -> Result<Vec<LeaderboardRecord>, StoreError>;
}
