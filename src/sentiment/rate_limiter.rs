// Slot-reservation rate limiter for hosted inference calls.
//
// Hosted inference free tiers throttle aggressively, and sentiment scoring
// fans out across several tasks at once. Each caller reserves the next free
// time slot under the lock, then sleeps until that slot outside the lock, so
// concurrent callers are spaced `interval` apart without queueing on the mutex.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Spaces requests at least `1 / requests_per_second` apart.
#[derive(Clone)]
pub struct RateLimiter {
    interval: Duration,
    /// Earliest instant the next request may start
    next_slot: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Non-positive rates disable limiting.
    pub fn new(requests_per_second: f64) -> Self {
        let interval = if requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            Duration::ZERO
        };
        Self {
            interval,
            next_slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Wait for this caller's slot.
    pub async fn acquire(&self) {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(reserved) if reserved > now => reserved,
                _ => now,
            };
            *next = Some(slot + self.interval);
            slot
        };
        tokio::time::sleep_until(slot).await;
    }
}
