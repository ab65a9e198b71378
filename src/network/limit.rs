//! Inbound flood protection.
//!
//! One token bucket per connection: every inbound frame costs one token and
//! tokens refill at `message_rate` per second up to `message_burst`.

use crate::config::LimitsConfig;
use std::time::Instant;

/// Token bucket rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    tokens: f32,
    last_check: Instant,
    rate: f32,
    capacity: f32,
}

impl RateLimiter {
    /// `rate` tokens per second, holding at most `capacity`.
    pub fn new(rate: f32, capacity: f32) -> Self {
        Self::starting_at(rate, capacity, Instant::now())
    }

    pub fn from_config(limits: &LimitsConfig) -> Self {
        Self::new(limits.message_rate, limits.message_burst)
    }

    fn starting_at(rate: f32, capacity: f32, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_check: now,
            rate,
            capacity,
        }
    }

    /// Consume a token if one is available.
    pub fn check(&mut self) -> bool {
        self.check_at(Instant::now())
    }

    fn check_at(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_check).as_secs_f32();
        self.last_check = now;
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn burst_is_allowed_then_refused() {
        let start = Instant::now();
        let mut limiter = RateLimiter::starting_at(10.0, 5.0, start);
        for _ in 0..5 {
            assert!(limiter.check_at(start));
        }
        assert!(!limiter.check_at(start));
    }

    #[test]
    fn tokens_refill_over_time() {
        let start = Instant::now();
        let mut limiter = RateLimiter::starting_at(10.0, 5.0, start);
        for _ in 0..5 {
            limiter.check_at(start);
        }
        let later = start + Duration::from_millis(250);
        assert!(limiter.check_at(later));
        assert!(limiter.check_at(later));
        assert!(!limiter.check_at(later));
    }

    #[test]
    fn refill_is_capped_at_burst() {
        let start = Instant::now();
        let mut limiter = RateLimiter::starting_at(100.0, 2.0, start);
        let much_later = start + Duration::from_secs(60);
        assert!(limiter.check_at(much_later));
        assert!(limiter.check_at(much_later));
        assert!(!limiter.check_at(much_later));
    }

    #[test]
    fn built_from_config() {
        let mut limiter = RateLimiter::from_config(&LimitsConfig::default());
        assert!(limiter.check());
    }
}
