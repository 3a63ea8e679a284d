mod config;
mod error;
mod gate;
mod handlers;
mod metrics;
mod models;
mod rate_limit;
mod signature;
mod state;
mod store;

use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Args;
use crate::gate::SubmissionGate;
use crate::rate_limit::IntervalLimiter;
use crate::state::AppState;
use crate::store::{LeaderboardStore, MemoryStore, RestStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let store: Arc<dyn LeaderboardStore> = match &args.store_url {
        Some(url) => {
            let store = RestStore::new(reqwest::Client::new(), url, args.store_key.clone());
            info!("Storing scores at {}", store.table_url());
            Arc::new(store)
        }
        None => {
            warn!("SUPABASE_URL not set, scores are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let limiter = Arc::new(IntervalLimiter::new(args.submit_interval_ms, args.rate_limit_capacity));
    let gate = SubmissionGate::new(limiter, store, args.signing_secret());

    if args.issue_signatures {
        warn!("Signing endpoint enabled, anyone who can reach it can mint valid scores");
    }

    let state = Arc::new(AppState {
        gate,
        issue_signatures: args.issue_signatures,
    });
    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Leaderboard gateway running on http://localhost:{}", args.port);
    info!(
        "Rate limit: one submission per {} ms per client, {} clients tracked",
        args.submit_interval_ms, args.rate_limit_capacity
    );
    axum::serve(listener, app).await?;
    Ok(())
}
