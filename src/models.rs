use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Leaderboard rows returned when no limit is given
pub const DEFAULT_LIMIT: usize = 10;

// A score submission that passed shape validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSubmission {
    pub name: String,
    pub score: i64,
    pub game_id: String,
    pub timestamp: i64, // epoch ms at signing time
    pub signature: String,
}

impl ScoreSubmission {
    /// Pulls the five required fields out of a JSON body.
    ///
    /// Returns `None` when any field is missing, empty, or of the wrong type.
    /// `score` may be negative here; the range check happens after the
    /// signature check. A zero `timestamp` counts as missing.
    pub fn from_json(body: &Value) -> Option<Self> {
        let fields = body.as_object()?;

        let name = non_empty_str(fields.get("name"))?;
        let score = integral(fields.get("score")?)?;
        let game_id = non_empty_str(fields.get("game_id"))?;
        let signature = non_empty_str(fields.get("signature"))?;
        let timestamp = integral(fields.get("timestamp")?).filter(|t| *t != 0)?;

        Some(Self {
            name,
            score,
            game_id,
            timestamp,
            signature,
        })
    }

    // The normalized row handed to storage
    pub fn into_entry(self) -> NewEntry {
        NewEntry {
            name: self.name,
            score: self.score,
            game_id: self.game_id,
        }
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// JSON numbers like 100 and 100.0 are both accepted, 100.5 is not
fn integral(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

// Row inserted into the leaderboard table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub name: String,
    pub score: i64,
    pub game_id: String,
}

// Row as stored, ids are uuid strings in the hosted table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRecord {
    pub id: String,
    pub name: String,
    pub score: i64,
    pub game_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardQuery {
    pub game_id: Option<String>, // None -> all games
    pub limit: usize,
}

impl Default for LeaderboardQuery {
    fn default() -> Self {
        Self {
            game_id: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

// Raw query string for GET /leaderboard, parsed leniently
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub game_id: Option<String>,
    pub limit: Option<String>,
}

impl ListParams {
    pub fn into_query(self) -> LeaderboardQuery {
        LeaderboardQuery {
            game_id: self.game_id.filter(|g| !g.is_empty()),
            limit: self
                .limit
                .and_then(|l| l.trim().parse().ok())
                .unwrap_or(DEFAULT_LIMIT),
        }
    }
}

// Request to the signing endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct SignRequest {
    pub score: i64,
    pub game_id: String,
}

// Everything a client needs to submit a score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedScore {
    pub score: i64,
    pub game_id: String,
    pub timestamp: i64,
    pub signature: String,
}
