//! Per-identity fixed-window rate limiter
//!
//! Each key owns a counter and the instant its window opened. The counter is
//! updated while holding the DashMap shard lock for that key, so concurrent
//! requests for the same identity never lose increments.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::shared::ShutdownSignal;

/// Rate limiter settings
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per key per window
    pub requests_per_window: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 60,
            window: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

struct Window {
    started: Instant,
    count: u32,
}

pub struct RateLimiter {
    config: RateLimitConfig,
    windows: DashMap<String, Window>,
}

pub type SharedRateLimiter = Arc<RateLimiter>;

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
        }
    }

    pub fn shared(config: RateLimitConfig) -> SharedRateLimiter {
        Arc::new(Self::new(config))
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut window = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window {
                started: now,
                count: 0,
            });

        if now.duration_since(window.started) >= self.config.window {
            window.started = now;
            window.count = 0;
        }

        if window.count >= self.config.requests_per_window {
            let retry_after = match window.started.checked_add(self.config.window) {
                Some(reopens) => reopens.saturating_duration_since(now),
                None => self.config.window,
            };
            return RateDecision::Limited { retry_after };
        }

        window.count += 1;
        RateDecision::Allowed {
            remaining: self.config.requests_per_window - window.count,
        }
    }

    /// Drop windows that have fully elapsed.
    pub fn sweep(&self) {
        let now = Instant::now();
        let window = self.config.window;
        self.windows
            .retain(|_, w| now.duration_since(w.started) < window);
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Sweep expired windows every `window` (at least once a second) until
    /// shutdown.
    pub fn start_sweeper(self: &Arc<Self>, shutdown: ShutdownSignal) {
        let limiter = Arc::clone(self);
        let period = self.config.window.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        limiter.sweep();
                        debug!(keys = limiter.tracked_keys(), "Rate limiter swept");
                    }
                    _ = shutdown.wait() => break,
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(limit: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            requests_per_window: limit,
            window: Duration::from_secs(60),
        })
    }

    #[test]
    fn rejects_after_limit_within_window() {
        let limiter = limiter(3);
        let now = Instant::now();

        assert_eq!(limiter.check_at("u1", now), RateDecision::Allowed { remaining: 2 });
        assert_eq!(limiter.check_at("u1", now), RateDecision::Allowed { remaining: 1 });
        assert_eq!(limiter.check_at("u1", now), RateDecision::Allowed { remaining: 0 });
        match limiter.check_at("u1", now + Duration::from_secs(10)) {
            RateDecision::Limited { retry_after } => assert_eq!(retry_after, Duration::from_secs(50)),
            other => panic!("expected limit, got {:?}", other),
        }
    }

    #[test]
    fn keys_are_independent() {
        let limiter = limiter(1);
        let now = Instant::now();
        assert!(matches!(limiter.check_at("a", now), RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check_at("b", now), RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check_at("a", now), RateDecision::Limited { .. }));
    }

    #[test]
    fn window_resets_after_elapsing() {
        let limiter = limiter(1);
        let now = Instant::now();
        assert!(matches!(limiter.check_at("a", now), RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check_at("a", now), RateDecision::Limited { .. }));
        assert!(matches!(
            limiter.check_at("a", now + Duration::from_secs(60)),
            RateDecision::Allowed { remaining: 0 }
        ));
    }

    #[test]
    fn concurrent_checks_never_exceed_limit() {
        let limiter = Arc::new(limiter(50));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    (0..20)
                        .filter(|_| matches!(limiter.check("same"), RateDecision::Allowed { .. }))
                        .count()
                })
            })
            .collect();

        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 50);
    }

    #[test]
    fn huge_window_does_not_overflow_retry_instant() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_window: 1,
            window: Duration::from_secs(u64::MAX),
        });
        let now = Instant::now();
        assert!(matches!(limiter.check_at("a", now), RateDecision::Allowed { .. }));
        match limiter.check_at("a", now) {
            RateDecision::Limited { retry_after } => assert!(retry_after > Duration::ZERO),
            other => panic!("expected limit, got {:?}", other),
        }
    }

    #[test]
    fn sweep_keeps_live_windows() {
        let limiter = limiter(5);
        limiter.check("live");
        limiter.sweep();
        assert_eq!(limiter.tracked_keys(), 1);
    }
}
