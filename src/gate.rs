use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::LeaderboardError;
use crate::metrics::{ACCEPTED_TOTAL, RATE_LIMIT_ENTRIES, REJECTIONS_TOTAL, SUBMISSIONS_TOTAL, SUBMIT_LATENCY};
use crate::models::{LeaderboardQuery, LeaderboardRecord, ScoreSubmission, SignRequest, SignedScore};
use crate::rate_limit::RateLimiter;
use crate::signature;
use crate::store::LeaderboardStore;

// Largest score a game may report
pub const MAX_SCORE: i64 = 1_000_000;

// Acceptance policy for score submissions
pub struct SubmissionGate {
    limiter: Arc<dyn RateLimiter>,
    store: Arc<dyn LeaderboardStore>,
    secret: String,
}

impl SubmissionGate {
    pub fn new(limiter: Arc<dyn RateLimiter>, store: Arc<dyn LeaderboardStore>, secret: String) -> Self {
        Self {
            limiter,
            store,
            secret,
        }
    }

    /// Runs one submission through the gate.
    ///
    /// Steps, each one stopping on failure: rate limit, shape, signature,
    /// range, storage. The rate limiter records the slot before the body is
    /// looked at, so a rejected submission still uses up the client's
    /// interval.
    pub async fn submit(
        &self,
        identifier: &str,
        body: &[u8],
        now_ms: i64,
    ) -> Result<Vec<LeaderboardRecord>, LeaderboardError> {
        SUBMISSIONS_TOTAL.inc();
        let start_time = Instant::now();

        let result = self.run(identifier, body, now_ms).await;

        SUBMIT_LATENCY.observe(start_time.elapsed().as_secs_f64());
        RATE_LIMIT_ENTRIES.set(self.limiter.len() as f64);
        match &result {
            Ok(_) => ACCEPTED_TOTAL.inc(),
            Err(e) => REJECTIONS_TOTAL.with_label_values(&[e.reason()]).inc(),
        }
        result
    }

    async fn run(
        &self,
        identifier: &str,
        body: &[u8],
        now_ms: i64,
    ) -> Result<Vec<LeaderboardRecord>, LeaderboardError> {
        if !self.limiter.allow(identifier, now_ms) {
            debug!(client = identifier, "Submission rate limited");
            return Err(LeaderboardError::RateLimited);
        }

        let json: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
            error!(client = identifier, error = %e, "Unreadable submission body");
            LeaderboardError::UnexpectedFailure(e.to_string())
        })?;

        let submission = ScoreSubmission::from_json(&json).ok_or(LeaderboardError::MalformedRequest)?;

        let verified = signature::verify_at(
            submission.score,
            &submission.game_id,
            submission.timestamp,
            &submission.signature,
            &self.secret,
            now_ms,
        );
        if !verified {
            warn!(
                client = identifier,
                game_id = %submission.game_id,
                score = submission.score,
                "Rejected score with invalid or stale signature"
            );
            return Err(LeaderboardError::InvalidSignature);
        }

        if !(0..=MAX_SCORE).contains(&submission.score) {
            warn!(client = identifier, score = submission.score, "Score out of range");
            return Err(LeaderboardError::OutOfRange);
        }

        let entry = submission.into_entry();
        let game_id = entry.game_id.clone();
        let score = entry.score;

        let stored = self.store.insert(entry).await.map_err(|e| {
            error!(error = %e, "Failed to store score");
            LeaderboardError::StorageFailure(e)
        })?;

        info!(client = identifier, game_id = %game_id, score, "Score accepted");
        Ok(stored)
    }

    pub async fn leaderboard(&self, query: &LeaderboardQuery) -> Result<Vec<LeaderboardRecord>, LeaderboardError> {
        self.store.query(query).await.map_err(|e| {
            error!(error = %e, "Failed to fetch leaderboard");
            LeaderboardError::FetchFailure(e)
        })
    }

    // Server-side signing for trusted callers
    pub fn issue(&self, request: SignRequest, now_ms: i64) -> Result<SignedScore, LeaderboardError> {
        if request.game_id.is_empty() {
            return Err(LeaderboardError::InvalidSignRequest);
        }
        if !(0..=MAX_SCORE).contains(&request.score) {
            return Err(LeaderboardError::OutOfRange);
        }

        let signature = signature::sign(request.score, &request.game_id, now_ms, &self.secret);
        Ok(SignedScore {
            score: request.score,
            game_id: request.game_id,
            timestamp: now_ms,
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewEntry;
    use crate::rate_limit::IntervalLimiter;
    use crate::store::{MemoryStore, StoreError};
    use async_trait::async_trait;
    use serde_json::json;

    const SECRET: &str = "s3cr3t";
    const T: i64 = 1_700_000_000_000;

    struct BrokenStore;

    #[async_trait]
    impl LeaderboardStore for BrokenStore {
        async fn insert(&self, _entry: NewEntry) -> Result<Vec<LeaderboardRecord>, StoreError> {
            Err(StoreError::Unavailable("connection reset".into()))
        }

        async fn query(&self, _query: &LeaderboardQuery) -> Result<Vec<LeaderboardRecord>, StoreError> {
            Err(StoreError::Unavailable("connection reset".into()))
        }
    }

    fn gate_with(store: Arc<dyn LeaderboardStore>) -> SubmissionGate {
        SubmissionGate::new(Arc::new(IntervalLimiter::default()), store, SECRET.to_string())
    }

    fn signed_body(name: &str, score: i64, game_id: &str, timestamp: i64) -> Vec<u8> {
        json!({
            "name": name,
            "score": score,
            "game_id": game_id,
            "timestamp": timestamp,
            "signature": signature::sign(score, game_id, timestamp, SECRET),
        })
        .to_string()
        .into_bytes()
    }

    #[tokio::test]
    async fn test_accepts_valid_submission() {
        let store = Arc::new(MemoryStore::new());
        let gate = gate_with(store.clone());

        let stored = gate
            .submit("10.0.0.1", &signed_body("ada", 100, "dna-match", T), T)
            .await
            .unwrap();

        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "ada");
        assert_eq!(stored[0].score, 100);
        assert_eq!(stored[0].game_id, "dna-match");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_second_request_rate_limited_and_not_stored() {
        let store = Arc::new(MemoryStore::new());
        let gate = gate_with(store.clone());

        gate.submit("10.0.0.1", &signed_body("ada", 100, "snake", T), T)
            .await
            .unwrap();

        let err = gate
            .submit("10.0.0.1", &signed_body("ada", 200, "snake", T + 1000), T + 1000)
            .await
            .unwrap_err();
        assert!(matches!(err, LeaderboardError::RateLimited));
        assert_eq!(store.len().await, 1);

        // other clients are unaffected
        gate.submit("10.0.0.2", &signed_body("bob", 50, "snake", T + 1000), T + 1000)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejected_submission_still_uses_slot() {
        let gate = gate_with(Arc::new(MemoryStore::new()));

        let err = gate.submit("10.0.0.1", b"{}", T).await.unwrap_err();
        assert!(matches!(err, LeaderboardError::MalformedRequest));

        let err = gate
            .submit("10.0.0.1", &signed_body("ada", 100, "snake", T + 10), T + 10)
            .await
            .unwrap_err();
        assert!(matches!(err, LeaderboardError::RateLimited));
    }

    #[tokio::test]
    async fn test_missing_field_rejected_before_signature_check() {
        let gate = gate_with(Arc::new(MemoryStore::new()));

        // bogus signature, but the missing name must win
        let body = json!({
            "score": 100,
            "game_id": "snake",
            "timestamp": T,
            "signature": "not-a-signature",
        });
        let err = gate
            .submit("10.0.0.1", body.to_string().as_bytes(), T)
            .await
            .unwrap_err();
        assert!(matches!(err, LeaderboardError::MalformedRequest));
    }

    #[tokio::test]
    async fn test_each_missing_field_is_malformed() {
        for (i, field) in ["name", "score", "game_id", "signature", "timestamp"].iter().enumerate() {
            let gate = gate_with(Arc::new(MemoryStore::new()));
            let mut body: serde_json::Value =
                serde_json::from_slice(&signed_body("ada", 100, "snake", T)).unwrap();
            body.as_object_mut().unwrap().remove(*field);

            let client = format!("client-{}", i);
            let err = gate
                .submit(&client, body.to_string().as_bytes(), T)
                .await
                .unwrap_err();
            assert!(matches!(err, LeaderboardError::MalformedRequest), "missing {}", field);
        }
    }

    #[tokio::test]
    async fn test_unparseable_body_is_unexpected_failure() {
        let gate = gate_with(Arc::new(MemoryStore::new()));
        let err = gate.submit("10.0.0.1", b"{not json", T).await.unwrap_err();
        assert!(matches!(err, LeaderboardError::UnexpectedFailure(_)));
    }

    #[tokio::test]
    async fn test_tampered_score_rejected() {
        let store = Arc::new(MemoryStore::new());
        let gate = gate_with(store.clone());

        let mut body: serde_json::Value =
            serde_json::from_slice(&signed_body("ada", 100, "snake", T)).unwrap();
        body["score"] = json!(999_999);

        let err = gate
            .submit("10.0.0.1", body.to_string().as_bytes(), T)
            .await
            .unwrap_err();
        assert!(matches!(err, LeaderboardError::InvalidSignature));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_out_of_range_rejected_even_when_signed() {
        let store = Arc::new(MemoryStore::new());
        let gate = gate_with(store.clone());

        let err = gate
            .submit("a", &signed_body("ada", -1, "snake", T), T)
            .await
            .unwrap_err();
        assert!(matches!(err, LeaderboardError::OutOfRange));

        let err = gate
            .submit("b", &signed_body("ada", 1_000_001, "snake", T), T)
            .await
            .unwrap_err();
        assert!(matches!(err, LeaderboardError::OutOfRange));

        // bounds themselves are fine
        gate.submit("c", &signed_body("ada", 0, "snake", T), T).await.unwrap();
        gate.submit("d", &signed_body("ada", MAX_SCORE, "snake", T), T).await.unwrap();
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces() {
        let gate = gate_with(Arc::new(BrokenStore));
        let err = gate
            .submit("10.0.0.1", &signed_body("ada", 100, "snake", T), T)
            .await
            .unwrap_err();
        assert!(matches!(err, LeaderboardError::StorageFailure(_)));

        let err = gate.leaderboard(&LeaderboardQuery::default()).await.unwrap_err();
        assert!(matches!(err, LeaderboardError::FetchFailure(_)));
    }

    #[tokio::test]
    async fn test_end_to_end_replay_after_window() {
        let store = Arc::new(MemoryStore::new());
        let gate = gate_with(store.clone());
        let body = signed_body("ada", 100, "dna-match", T);

        gate.submit("10.0.0.1", &body, T).await.unwrap();

        // same signed tuple replayed 70 seconds later
        let err = gate.submit("10.0.0.1", &body, T + 70_000).await.unwrap_err();
        assert!(matches!(err, LeaderboardError::InvalidSignature));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_leaderboard_delegates_to_store() {
        let gate = gate_with(Arc::new(MemoryStore::new()));
        gate.submit("a", &signed_body("ada", 10, "snake", T), T).await.unwrap();
        gate.submit("b", &signed_body("bob", 30, "snake", T), T).await.unwrap();
        gate.submit("c", &signed_body("cy", 20, "dna-match", T), T).await.unwrap();

        let rows = gate
            .leaderboard(&LeaderboardQuery {
                game_id: Some("snake".into()),
                limit: 10,
            })
            .await
            .unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["bob", "ada"]);
    }

    #[tokio::test]
    async fn test_issued_signature_is_accepted() {
        let gate = gate_with(Arc::new(MemoryStore::new()));
        let signed = gate
            .issue(
                SignRequest {
                    score: 420,
                    game_id: "dna-match".into(),
                },
                T,
            )
            .unwrap();
        assert_eq!(signed.timestamp, T);
        assert_eq!(signed.signature, signature::sign(420, "dna-match", T, SECRET));

        let body = json!({
            "name": "ada",
            "score": signed.score,
            "game_id": signed.game_id,
            "timestamp": signed.timestamp,
            "signature": signed.signature,
        });
        gate.submit("10.0.0.1", body.to_string().as_bytes(), T + 500)
            .await
            .unwrap();
    }

    #[test]
    fn test_issue_validates_request() {
        let gate = gate_with(Arc::new(MemoryStore::new()));
        let err = gate
            .issue(SignRequest { score: 1, game_id: String::new() }, T)
            .unwrap_err();
        assert!(matches!(err, LeaderboardError::InvalidSignRequest));
        assert_eq!(err.to_string(), "Missing required fields: score, game_id");

        let err = gate
            .issue(SignRequest { score: MAX_SCORE + 1, game_id: "snake".into() }, T)
            .unwrap_err();
        assert!(matches!(err, LeaderboardError::OutOfRange));
    }
}
