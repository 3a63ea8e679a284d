use clap::{ArgAction, Parser, builder::BoolishValueParser};
use tracing::warn;

use crate::rate_limit::{DEFAULT_CAPACITY, SUBMIT_INTERVAL_MS};

// Used when no secret is configured. Never deploy with this.
pub const DEV_SIGNING_SECRET: &str = "dev-secret-keep-it-safe";

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "leaderboard-gateway")]
#[command(about = "Signed score submissions and leaderboards for the site's games")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Shared HMAC secret for score signatures
    #[arg(long, env = "SCORE_SIGNING_SECRET", hide_env_values = true)]
    pub signing_secret: Option<String>,

    // PostgREST base url, e.g. https://xyz.supabase.co
    // In-memory store when missing
    #[arg(long, env = "SUPABASE_URL")]
    pub store_url: Option<String>,

    #[arg(long, env = "SUPABASE_ANON_KEY", default_value = "", hide_env_values = true)]
    pub store_key: String,

    // Minimum milliseconds between submissions from one client
    #[arg(long, env = "SUBMIT_INTERVAL_MS", default_value_t = SUBMIT_INTERVAL_MS)]
    pub submit_interval_ms: i64,

    // Tracked clients before the rate limiter is wiped
    #[arg(long, env = "RATE_LIMIT_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
    pub rate_limit_capacity: usize,

    // Expose POST /leaderboard/sign
    // Env accepts 1/0, yes/no, on/off, true/false
    #[arg(long, env = "ISSUE_SIGNATURES", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    pub issue_signatures: bool,
}

impl Args {
    /// The configured secret, or [`DEV_SIGNING_SECRET`] when it is unset or
    /// blank.
    pub fn signing_secret(&self) -> String {
        match self.signing_secret.as_deref().map(str::trim) {
            Some(secret) if !secret.is_empty() => secret.to_string(),
            _ => {
                warn!("SCORE_SIGNING_SECRET not set, using the development secret");
                DEV_SIGNING_SECRET.to_string()
            }
        }
    }
}
