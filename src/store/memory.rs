use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{LeaderboardStore, StoreError};
use crate::models::{LeaderboardQuery, LeaderboardRecord, NewEntry};

// Process-local table, lost on restart
pub struct MemoryStore {
    rows: RwLock<Vec<LeaderboardRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LeaderboardStore for MemoryStore {
    async fn insert(&self, entry: NewEntry) -> Result<Vec<LeaderboardRecord>, StoreError> {
        let record = LeaderboardRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: entry.name,
            score: entry.score,
            game_id: entry.game_id,
            created_at: Some(chrono::Utc::now()),
        };

        self.rows.write().await.push(record.clone());
        Ok(vec![record])
    }

    async fn query(&self, query: &LeaderboardQuery) -> Result<Vec<LeaderboardRecord>, StoreError> {
        let rows = self.rows.read().await;

        let mut matching: Vec<LeaderboardRecord> = rows
            .iter()
            .filter(|r| query.game_id.as_deref().is_none_or(|g| r.game_id == g))
            .cloned()
            .collect();

        // stable sort: equal scores stay in insertion order
        matching.sort_by(|a, b| b.score.cmp(&a.score));
        matching.truncate(query.limit);
        Ok(matching)
    }
}
