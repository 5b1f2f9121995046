//! Per-action request throttling.
//!
//! Each API action gets its own slot schedule: with a limit of N per
//! second, consecutive calls to the same action are spaced at least
//! `1s / N` apart. Different actions never wait on each other.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::config::ratelimit::DEFAULT_PER_SECOND;

/// Spaces out calls per action.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    /// Allow `per_second` calls per action. Zero disables throttling.
    pub fn new(per_second: u32) -> Self {
        let interval = if per_second == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / per_second
        };
        Self {
            interval,
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    /// Wait until `action` may be called again.
    pub async fn check(&self, action: &str) {
        let wait = self.reserve(action, Instant::now());
        if !wait.is_zero() {
            trace!(action, wait_ms = wait.as_millis() as u64, "Rate limited");
            tokio::time::sleep(wait).await;
        }
    }

    /// Claim the next slot for `action` and return how long to wait for it.
    fn reserve(&self, action: &str, now: Instant) -> Duration {
        let mut slots = self.next_slot.lock().unwrap_or_else(|e| e.into_inner());
        let slot = slots.entry(action.to_string()).or_insert(now);
        let start = (*slot).max(now);
        *slot = start + self.interval;
        start - now
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_PER_SECOND)
    }
}
