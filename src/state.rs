use std::sync::Arc;

use crate::gate::SubmissionGate;

// app's shared state
pub struct AppState {
    pub gate: SubmissionGate,
    pub issue_signatures: bool, // serve POST /leaderboard/sign
}

pub type SharedState = Arc<AppState>;
