//! Per-client request throttling.
//!
//! Classic token bucket per client identifier, with a periodic sweep that
//! evicts idle visitors to bound memory growth. Applied only to the
//! unauthenticated, higher-risk entry points (login/signup), not uniformly.
//!
//! The client identifier is the caller-supplied User-Agent string, which is
//! trivially spoofable. That is a known weakness carried over deliberately;
//! changing the keying is a behavior change, not a bug fix.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct TokenBucket {
    // ---
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    // ---
    fn full(burst: u32, now: Instant) -> Self {
        // ---
        Self {
            tokens: f64::from(burst),
            last_refill: now,
        }
    }

    fn allow(&mut self, now: Instant, per_second: f64, burst: u32) -> bool {
        // ---
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * per_second).min(f64::from(burst));
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

struct Visitor {
    // ---
    bucket: TokenBucket,
    last_seen: Instant,
}

/// Per-client token-bucket throttle with idle eviction.
///
/// One mutex guards the visitor map; the critical section covers only the
/// lookup/insert and the O(1) bucket arithmetic.
pub struct RateLimiter {
    // ---
    per_second: f64,
    burst: u32,
    idle_after: Duration,
    visitors: Mutex<HashMap<String, Visitor>>,
}

impl RateLimiter {
    // ---
    pub fn new(per_second: f64, burst: u32, idle_after: Duration) -> Self {
        // ---
        Self {
            per_second,
            burst,
            idle_after,
            visitors: Mutex::new(HashMap::new()),
        }
    }

    /// Whether `client_id` currently has capacity. Creates the visitor on
    /// first sight (a fresh bucket starts full) and refreshes last-seen.
    pub fn allow(&self, client_id: &str) -> bool {
        // ---
        self.allow_at(client_id, Instant::now())
    }

    fn allow_at(&self, client_id: &str, now: Instant) -> bool {
        // ---
        let mut visitors = lock(&self.visitors);
        let visitor = visitors
            .entry(client_id.to_string())
            .or_insert_with(|| Visitor {
                bucket: TokenBucket::full(self.burst, now),
                last_seen: now,
            });

        visitor.last_seen = now;
        visitor.bucket.allow(now, self.per_second, self.burst)
    }

    /// Evict visitors idle beyond the threshold. Returns the number evicted.
    pub fn evict_idle(&self) -> usize {
        // ---
        let mut visitors = lock(&self.visitors);
        let before = visitors.len();
        let idle_after = self.idle_after;
        visitors.retain(|_, v| v.last_seen.elapsed() <= idle_after);
        before - visitors.len()
    }

    #[cfg(test)]
    fn visitor_count(&self) -> usize {
        lock(&self.visitors).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
