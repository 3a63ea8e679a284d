use lazy_static::lazy_static;
use prometheus::{
    Gauge, Histogram, IntCounter, IntCounterVec, register_gauge, register_histogram,
    register_int_counter, register_int_counter_vec,
};

lazy_static! {
    pub static ref SUBMISSIONS_TOTAL: IntCounter =
        register_int_counter!("leaderboard_submissions_total", "Total score submissions received").unwrap();
    pub static ref ACCEPTED_TOTAL: IntCounter =
        register_int_counter!("leaderboard_accepted_total", "Score submissions stored").unwrap();
    pub static ref REJECTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "leaderboard_rejections_total",
        "Score submissions rejected, by reason",
        &["reason"]
    )
    .unwrap();
    pub static ref SUBMIT_LATENCY: Histogram = register_histogram!(
        "leaderboard_submit_latency_seconds",
        "Score submission latency in seconds"
    )
    .unwrap();
    pub static ref RATE_LIMIT_ENTRIES: Gauge =
        register_gauge!("leaderboard_rate_limit_entries", "Client identifiers tracked by the rate limiter").unwrap();
}
