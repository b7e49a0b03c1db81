//! Global token bucket rate limiting.

use std::sync::Mutex;
use std::time::Instant;

use crate::config::RateLimitConfig;

/// A simple token bucket.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_update: now,
        }
    }

    fn try_acquire(&mut self, now: Instant, capacity: f64, refill_rate: f64) -> bool {
        // A clock reading older than the last one refills nothing.
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();

        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        if now > self.last_update {
            self.last_update = now;
        }

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Token bucket shared by every request.
///
/// Admits at most `capacity` requests in a burst and `refill_rate` per second
/// sustained. The bucket sits behind a mutex so concurrent callers observe a
/// single order of token consumption.
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Mutex<TokenBucket>,
    capacity: f64,
    refill_rate: f64,
}

impl RateLimiter {
    pub fn new(capacity: u32, refill_rate: f64) -> Self {
        Self::starting_at(capacity, refill_rate, Instant::now())
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.capacity, config.refill_per_second)
    }

    /// Create a full bucket whose clock starts at `now`.
    pub fn starting_at(capacity: u32, refill_rate: f64, now: Instant) -> Self {
        let capacity = capacity as f64;
        Self {
            bucket: Mutex::new(TokenBucket::new(capacity, now)),
            capacity,
            refill_rate,
        }
    }

    /// Try to consume one token now.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    /// Try to consume one token as of `now`.
    pub fn allow_at(&self, now: Instant) -> bool {
        let mut bucket = self.bucket.lock().expect("rate limiter mutex poisoned");
        bucket.try_acquire(now, self.capacity, self.refill_rate)
    }

    /// Tokens currently available, without refilling.
    pub fn available(&self) -> f64 {
        self.bucket.lock().expect("rate limiter mutex poisoned").tokens
    }
}
