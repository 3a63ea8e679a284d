use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

// Signatures older than this are rejected as replays
pub const FRESHNESS_WINDOW_MS: i64 = 60_000;

// Current wall clock in epoch milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// HMAC-SHA256 over `"{score}:{game_id}:{timestamp}"`, lowercase hex.
pub fn sign(score: i64, game_id: &str, timestamp: i64, secret: &str) -> String {
    let message = format!("{}:{}:{}", score, game_id, timestamp);

    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    format!("{:x}", mac.finalize().into_bytes())
}

/// Verifies a score signature as of `now_ms`.
///
/// Stale signatures fail before any hashing; otherwise the recomputed
/// signature is compared in constant time. `now_ms` is the verifier's
/// clock, normally [`now_ms()`].
pub fn verify_at(
    score: i64,
    game_id: &str,
    timestamp: i64,
    signature: &str,
    secret: &str,
    now_ms: i64,
) -> bool {
    if now_ms.saturating_sub(timestamp) > FRESHNESS_WINDOW_MS {
        return false;
    }

    let expected = sign(score, game_id, timestamp, secret);
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}
