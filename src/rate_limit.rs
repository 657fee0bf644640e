//! Client-side sliding-window rate limiting.
//!
//! Each key keeps the timestamps of its accepted hits inside the window.
//! A hit is accepted while fewer than `max_events` remain in the window.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::time::{Duration, Instant};

/// Rejected hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    /// Time until the oldest hit leaves the window
    pub retry_after: Duration,
}

impl fmt::Display for RateLimited {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rate limited, retry in {:.1}s", self.retry_after.as_secs_f32())
    }
}

impl std::error::Error for RateLimited {}

/// Sliding-window limiter keyed by action or user.
pub struct RateLimiter {
    max_events: usize,
    window: Duration,
    hits: HashMap<String, VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_events: usize, window: Duration) -> Self {
        Self {
            max_events,
            window,
            hits: HashMap::new(),
        }
    }

    /// Record a hit for `key` at `now`, or report how long to wait.
    pub fn check(&mut self, key: &str, now: Instant) -> Result<(), RateLimited> {
        let window = self.window;
        let in_window = self.live_hits(key, now);

        if in_window >= self.max_events {
            let retry_after = self
                .hits
                .get(key)
                .and_then(|hits| hits.front())
                .map(|oldest| (*oldest + window).saturating_duration_since(now))
                .unwrap_or(window);
            log::debug!("rate limit hit for {}: retry in {:?}", key, retry_after);
            return Err(RateLimited { retry_after });
        }

        self.hits.entry(key.to_string()).or_default().push_back(now);
        Ok(())
    }

    /// Hits still available for `key` at `now`.
    pub fn remaining(&mut self, key: &str, now: Instant) -> usize {
        let in_window = self.live_hits(key, now);
        self.max_events.saturating_sub(in_window)
    }

    /// Evict expired hits for `key`, dropping the key once it has none left.
    fn live_hits(&mut self, key: &str, now: Instant) -> usize {
        let window = self.window;
        let Some(hits) = self.hits.get_mut(key) else {
            return 0;
        };
        evict(hits, window, now);
        let len = hits.len();
        if len == 0 {
            self.hits.remove(key);
        }
        len
    }

    pub fn reset(&mut self, key: &str) {
        self.hits.remove(key);
    }
}

fn evict(hits: &mut VecDeque<Instant>, window: Duration, now: Instant) {
    while let Some(oldest) = hits.front() {
        if now.saturating_duration_since(*oldest) >= window {
            hits.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_max() {
        let mut rl = RateLimiter::new(3, Duration::from_secs(10));
        let t0 = Instant::now();
        for i in 0..3 {
            assert!(rl.check("chat", t0 + Duration::from_secs(i)).is_ok());
        }
        let err = rl.check("chat", t0 + Duration::from_secs(4)).unwrap_err();
        assert_eq!(err.retry_after, Duration::from_secs(6));
    }

    #[test]
    fn test_window_slides() {
        let mut rl = RateLimiter::new(2, Duration::from_secs(10));
        let t0 = Instant::now();
        rl.check("k", t0).unwrap();
        rl.check("k", t0 + Duration::from_secs(5)).unwrap();
        assert!(rl.check("k", t0 + Duration::from_secs(9)).is_err());
        // First hit expires at t0 + 10s
        assert!(rl.check("k", t0 + Duration::from_secs(10)).is_ok());
        assert_eq!(rl.remaining("k", t0 + Duration::from_secs(10)), 0);
        assert_eq!(rl.remaining("k", t0 + Duration::from_secs(16)), 1);
    }

    #[test]
    fn test_rejected_hits_are_not_recorded() {
        let mut rl = RateLimiter::new(1, Duration::from_secs(10));
        let t0 = Instant::now();
        rl.check("k", t0).unwrap();
        for s in 1..10 {
            assert!(rl.check("k", t0 + Duration::from_secs(s)).is_err());
        }
        assert!(rl.check("k", t0 + Duration::from_secs(10)).is_ok());
    }

    #[test]
    fn test_keys_are_independent() {
        let mut rl = RateLimiter::new(1, Duration::from_secs(60));
        let t0 = Instant::now();
        rl.check("alice", t0).unwrap();
        assert!(rl.check("bob", t0).is_ok());
        assert!(rl.check("alice", t0).is_err());
        rl.reset("alice");
        assert!(rl.check("alice", t0).is_ok());
    }

    #[test]
    fn test_idle_keys_are_dropped() {
        let mut rl = RateLimiter::new(2, Duration::from_secs(10));
        let t0 = Instant::now();
        rl.check("alice", t0).unwrap();
        rl.check("bob", t0).unwrap();
        assert_eq!(rl.hits.len(), 2);

        // Both windows have expired; touching a key drops it
        let later = t0 + Duration::from_secs(10);
        assert_eq!(rl.remaining("alice", later), 2);
        assert!(!rl.hits.contains_key("alice"));
        rl.check("bob", later).unwrap();
        assert_eq!(rl.hits.get("bob").map(|h| h.len()), Some(1));
    }

    #[test]
    fn test_zero_budget_always_rejects() {
        let mut rl = RateLimiter::new(0, Duration::from_secs(5));
        let err = rl.check("k", Instant::now()).unwrap_err();
        assert_eq!(err.retry_after, Duration::from_secs(5));
        assert_eq!(rl.remaining("k", Instant::now()), 0);
        // Rejections never allocate an entry
        assert!(rl.hits.is_empty());
    }
}
