//! Per-Client Sliding-Window Rate Limiter
//!
//! Tracks recent request timestamps per client identifier and admits or
//! rejects each request under a fixed quota. Transport-agnostic: the API
//! layer extracts a client id and calls [`RateLimiter::admit`].
//!
//! Admission keeps a sliding log per identifier. On every call the stored
//! timestamps are pruned to the trailing window before the quota check, so
//! the invariant "every stored timestamp is inside the window" holds at each
//! read. Rejected requests are not recorded: a rejected burst leaves no
//! trace beyond the pruning.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use crate::error::AdvisorError;

/// How many admission checks between opportunistic sweeps of idle clients.
const SWEEP_INTERVAL: u64 = 1024;

/// In-memory sliding-window rate limiter shared across request handlers.
///
/// Cloning is cheap; clones share the same window store.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<RateLimiterInner>,
}

struct RateLimiterInner {
    limit: usize,
    window: Duration,
    windows: RwLock<FxHashMap<String, Vec<Instant>>>,
    calls: AtomicU64,
}

impl RateLimiter {
    /// Create a limiter admitting up to `limit` requests per 60-second
    /// trailing window.
    pub fn new(limit: usize) -> Self {
        Self::with_window(limit, Duration::from_secs(60))
    }

    /// Create a limiter with a custom window duration.
    pub fn with_window(limit: usize, window: Duration) -> Self {
        Self {
            inner: Arc::new(RateLimiterInner {
                limit,
                window,
                windows: RwLock::new(FxHashMap::default()),
                calls: AtomicU64::new(0),
            }),
        }
    }

    /// Admit or reject a request from `client_id` at the current time.
    pub fn admit(&self, client_id: &str) -> Result<(), AdvisorError> {
        self.admit_at(client_id, Instant::now())
    }

    /// Admit or reject a request from `client_id` at an explicit instant.
    ///
    /// Prunes the client's stored timestamps to the trailing window, checks
    /// the quota against the pruned window, and records `now` only on
    /// admission. The prune-check-append sequence runs under one write
    /// guard, so two concurrent requests at the limit boundary cannot both
    /// be admitted.
    pub fn admit_at(&self, client_id: &str, now: Instant) -> Result<(), AdvisorError> {
        let mut windows = self
            .inner
            .windows
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let window = windows.entry(client_id.to_string()).or_default();
        window.retain(|&t| now.duration_since(t) < self.inner.window);

        if window.len() >= self.inner.limit {
            // Oldest surviving timestamp decides when a slot frees up.
            let retry_after = window
                .first()
                .map(|&oldest| self.inner.window.saturating_sub(now.duration_since(oldest)))
                .unwrap_or(self.inner.window);
            return Err(AdvisorError::RateLimitExceeded { retry_after });
        }

        window.push(now);
        drop(windows);

        if self.inner.calls.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            self.sweep_idle(now);
        }

        Ok(())
    }

    /// Drop identifiers whose windows contain no timestamp inside the
    /// trailing window at `now`. Idle clients otherwise accumulate one map
    /// entry each for the life of the process.
    pub fn sweep_idle(&self, now: Instant) {
        let mut windows = self
            .inner
            .windows
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let before = windows.len();
        windows.retain(|_, ts| {
            ts.iter()
                .any(|&t| now.duration_since(t) < self.inner.window)
        });
        let dropped = before - windows.len();
        if dropped > 0 {
            tracing::debug!("rate limiter swept {} idle clients", dropped);
        }
    }

    /// Number of client identifiers currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.inner
            .windows
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn limit(&self) -> usize {
        self.inner.limit
    }

    pub fn window(&self) -> Duration {
        self.inner.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_boundary() {
        let limiter = RateLimiter::new(3);
        let t0 = Instant::now();

        for i in 0..3 {
            assert!(
                limiter.admit_at("10.0.0.1", t0 + Duration::from_secs(i)).is_ok(),
                "call {} should be admitted",
                i + 1
            );
        }

        // 4th call inside the window is rejected
        let err = limiter
            .admit_at("10.0.0.1", t0 + Duration::from_secs(3))
            .unwrap_err();
        match err {
            AdvisorError::RateLimitExceeded { retry_after } => {
                // Oldest timestamp was at t0, so the slot frees 57 s later
                assert_eq!(retry_after, Duration::from_secs(57));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_first_request_always_admitted() {
        let limiter = RateLimiter::new(1);
        assert!(limiter.admit("fresh-client").is_ok());
    }

    #[test]
    fn test_oldest_timestamp_ages_out() {
        let limiter = RateLimiter::new(2);
        let t0 = Instant::now();

        assert!(limiter.admit_at("c", t0).is_ok());
        assert!(limiter.admit_at("c", t0 + Duration::from_secs(10)).is_ok());
        assert!(limiter.admit_at("c", t0 + Duration::from_secs(20)).is_err());

        // t0 ages out at t0+60; exactly one slot frees up
        let t = t0 + Duration::from_secs(61);
        assert!(limiter.admit_at("c", t).is_ok());
        assert!(limiter.admit_at("c", t + Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = RateLimiter::new(1);
        let t0 = Instant::now();

        assert!(limiter.admit_at("a", t0).is_ok());
        assert!(limiter.admit_at("a", t0).is_err());
        // Saturating "a" never affects "b"
        assert!(limiter.admit_at("b", t0).is_ok());
    }

    #[test]
    fn test_rejected_requests_leave_no_trace() {
        let limiter = RateLimiter::new(2);
        let t0 = Instant::now();

        assert!(limiter.admit_at("c", t0).is_ok());
        assert!(limiter.admit_at("c", t0 + Duration::from_secs(1)).is_ok());

        // A rejected burst must not extend the window
        for i in 2..10 {
            assert!(limiter.admit_at("c", t0 + Duration::from_secs(i)).is_err());
        }

        // Both admitted timestamps age out by t0+62 regardless of the burst
        assert!(limiter.admit_at("c", t0 + Duration::from_secs(62)).is_ok());
        assert!(limiter.admit_at("c", t0 + Duration::from_secs(62)).is_ok());
    }

    #[test]
    fn test_custom_window() {
        let limiter = RateLimiter::with_window(1, Duration::from_secs(5));
        let t0 = Instant::now();

        assert!(limiter.admit_at("c", t0).is_ok());
        assert!(limiter.admit_at("c", t0 + Duration::from_secs(4)).is_err());
        assert!(limiter.admit_at("c", t0 + Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_sweep_drops_idle_clients() {
        let limiter = RateLimiter::new(5);
        let t0 = Instant::now();

        limiter.admit_at("idle", t0).unwrap();
        limiter.admit_at("active", t0 + Duration::from_secs(90)).unwrap();
        assert_eq!(limiter.tracked_clients(), 2);

        limiter.sweep_idle(t0 + Duration::from_secs(90));
        assert_eq!(limiter.tracked_clients(), 1);

        // Swept client starts from an empty window again
        assert!(limiter.admit_at("idle", t0 + Duration::from_secs(91)).is_ok());
    }
}
