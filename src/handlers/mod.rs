mod health;
mod leaderboard;
mod metrics;

pub use health::health_handler;
pub use leaderboard::{list_handler, sign_handler, submit_handler};
pub use metrics::metrics_handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::SharedState;

pub fn router(state: SharedState) -> Router {
    let mut app = Router::new()
        .route("/health", get(health_handler))
        .route("/leaderboard", get(list_handler).post(submit_handler))
        .route("/metrics", get(metrics_handler));

    if state.issue_signatures {
        app = app.route("/leaderboard/sign", post(sign_handler));
    }

    app.with_state(state)
}
