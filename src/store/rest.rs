use async_trait::async_trait;
use reqwest::{Response, Url};

use super::{LeaderboardStore, StoreError};
use crate::models::{LeaderboardQuery, LeaderboardRecord, NewEntry};

const TABLE: &str = "leaderboard";

// Hosted Postgres behind a PostgREST endpoint (Supabase layout)
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: String) -> Self {
        // add https:// if not present
        let base_url = if base_url.starts_with("http") {
            base_url.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", base_url.trim_end_matches('/'))
        };

        Self {
            client,
            base_url,
            api_key,
        }
    }

    pub fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TABLE)
    }

    fn query_url(&self, query: &LeaderboardQuery) -> Result<Url, StoreError> {
        let limit = query.limit.to_string();
        let mut params = vec![
            ("select", "*".to_string()),
            ("order", "score.desc".to_string()),
            ("limit", limit),
        ];
        if let Some(game_id) = &query.game_id {
            params.push(("game_id", format!("eq.{}", game_id)));
        }

        Url::parse_with_params(&self.table_url(), &params)
            .map_err(|e| StoreError::Unavailable(format!("bad store url: {}", e)))
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }
}

// Non-2xx responses carry the PostgREST error body
async fn rows(res: Response) -> Result<Vec<LeaderboardRecord>, StoreError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(StoreError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(res.json::<Vec<LeaderboardRecord>>().await?)
}

#[async_trait]
impl LeaderboardStore for RestStore {
    async fn insert(&self, entry: NewEntry) -> Result<Vec<LeaderboardRecord>, StoreError> {
        let res = self
            .authorized(self.client.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(&entry)
            .send()
            .await?;

        rows(res).await
    }

    async fn query(&self, query: &LeaderboardQuery) -> Result<Vec<LeaderboardRecord>, StoreError> {
        let url = self.query_url(query)?;
        let res = self.authorized(self.client.get(url)).send().await?;

        rows(res).await
    }
}
