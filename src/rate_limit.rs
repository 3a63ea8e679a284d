use dashmap::DashMap;

// Minimum gap between two score submissions from one client
pub const SUBMIT_INTERVAL_MS: i64 = 5000;

// Map is wiped once it holds more identifiers than this
pub const DEFAULT_CAPACITY: usize = 1000;

/// Decides whether a client may make a request at `now_ms`.
///
/// The gate only depends on this capability, so a deployment running several
/// instances can back it with a shared store instead of process memory.
pub trait RateLimiter: Send + Sync {
    fn allow(&self, identifier: &str, now_ms: i64) -> bool;

    // Number of tracked identifiers
    fn len(&self) -> usize;
}

// In-memory limiter: one request per `min_interval_ms` per identifier
pub struct IntervalLimiter {
    last_seen: DashMap<String, i64>, // identifier -> last allowed request (epoch ms)
    min_interval_ms: i64,
    capacity: usize,
}

impl IntervalLimiter {
    pub fn new(min_interval_ms: i64, capacity: usize) -> Self {
        Self {
            last_seen: DashMap::new(),
            min_interval_ms,
            capacity,
        }
    }
}

impl Default for IntervalLimiter {
    fn default() -> Self {
        Self::new(SUBMIT_INTERVAL_MS, DEFAULT_CAPACITY)
    }
}

impl RateLimiter for IntervalLimiter {
    fn allow(&self, identifier: &str, now_ms: i64) -> bool {
        {
            let mut last = self.last_seen.entry(identifier.to_string()).or_insert(i64::MIN);

            // too soon..? reject without moving the slot
            if now_ms.saturating_sub(*last) < self.min_interval_ms {
                return false;
            }
            *last = now_ms;
        } // entry guard released before touching the whole map

        // crude growth guard: drop everything, including the entry just written
        if self.last_seen.len() > self.capacity {
            tracing::debug!(entries = self.last_seen.len(), "Rate limiter over capacity, clearing");
            self.last_seen.clear();
        }

        true
    }

    fn len(&self) -> usize {
        self.last_seen.len()
    }
}
