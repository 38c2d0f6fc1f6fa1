//! Rate limiter for WebSocket message handling.
//!
//! Limits the number of messages a client can send within a time window.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Rate limiter using a sliding window algorithm
#[derive(Debug)]
pub struct RateLimiter {
    /// Timestamps of recent requests
    timestamps: VecDeque<Instant>,
    /// Maximum number of requests allowed in the window
    max_requests: usize,
    /// Time window for rate limiting
    window: Duration,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Example
    ///
    /// ```
    /// use bluff_server::api::rate_limiter::RateLimiter;
    /// use std::time::Duration;
    ///
    /// // Allow 10 requests per second
    /// let limiter = RateLimiter::new(10, Duration::from_secs(1));
    /// ```
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_requests),
            max_requests,
            window,
        }
    }

    /// Short window for bursts
    pub fn per_second(max_requests: usize) -> Self {
        Self::new(max_requests, Duration::from_secs(1))
    }

    /// Long window for sustained traffic
    pub fn per_minute(max_requests: usize) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Check if a request should be allowed
    ///
    /// Returns `true` if the request is allowed, `false` if rate limit exceeded.
    ///
    /// ```
    /// # use bluff_server::api::rate_limiter::RateLimiter;
    /// let mut limiter = RateLimiter::per_second(2);
    /// assert!(limiter.check());
    /// assert!(limiter.check());
    /// assert!(!limiter.check());
    /// ```
    pub fn check(&mut self) -> bool {
        self.check_at(Instant::now())
    }

    fn check_at(&mut self, now: Instant) -> bool {
        while let Some(ts) = self.timestamps.front() {
            if now.duration_since(*ts) > self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }

        if self.timestamps.len() >= self.max_requests {
            return false;
        }

        self.timestamps.push_back(now);
        true
    }

    /// Get the number of remaining requests allowed in the current window
    pub fn remaining(&self) -> usize {
        self.max_requests.saturating_sub(self.timestamps.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_over_limit() {
        let mut limiter = RateLimiter::new(3, Duration::from_secs(1));

        for _ in 0..3 {
            assert!(limiter.check());
        }
        assert!(!limiter.check(), "Should block request over limit");
        assert_eq!(limiter.remaining(), 0);
    }

    #[test]
    fn test_window_slides() {
        let mut limiter = RateLimiter::new(2, Duration::from_millis(100));
        let start = Instant::now();

        assert!(limiter.check_at(start));
        assert!(limiter.check_at(start + Duration::from_millis(60)));
        assert!(!limiter.check_at(start + Duration::from_millis(90)));

        // First timestamp has expired, second has not
        assert!(limiter.check_at(start + Duration::from_millis(120)));
        assert!(!limiter.check_at(start + Duration::from_millis(130)));
    }

    #[test]
    fn test_blocked_requests_are_not_recorded() {
        let mut limiter = RateLimiter::new(1, Duration::from_millis(100));
        let start = Instant::now();

        assert!(limiter.check_at(start));
        for ms in [10, 20, 30] {
            assert!(!limiter.check_at(start + Duration::from_millis(ms)));
        }
        assert!(limiter.check_at(start + Duration::from_millis(101)));
    }

    #[test]
    fn test_constructors() {
        let mut burst = RateLimiter::per_second(10);
        for _ in 0..10 {
            assert!(burst.check());
        }
        assert!(!burst.check(), "Burst limiter should block 11th request");

        let sustained = RateLimiter::per_minute(100);
        assert_eq!(sustained.max_requests(), 100);
        assert_eq!(sustained.remaining(), 100);
    }
}
