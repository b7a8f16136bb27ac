//! Minimum-interval rate limiter.
//!
//! Callers block until `min_interval` has passed since the previous call.
//! The lock is held while sleeping, so concurrent callers queue up and stay
//! spaced.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Block until the next call is allowed. Returns how long this call slept.
    pub fn wait(&self) -> Duration {
        let mut last = self.last_call.lock().unwrap_or_else(PoisonError::into_inner);
        let slept = match *last {
            Some(prev) => {
                let remaining = self.min_interval.saturating_sub(prev.elapsed());
                if !remaining.is_zero() {
                    tracing::debug!(sleep_ms = remaining.as_millis() as u64, "rate limiting");
                    std::thread::sleep(remaining);
                }
                remaining
            }
            None => Duration::ZERO,
        };
        *last = Some(Instant::now());
        slept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_does_not_sleep() {
        let limiter = RateLimiter::new(Duration::from_secs(60));
        assert_eq!(limiter.wait(), Duration::ZERO);
    }

    #[test]
    fn second_call_is_spaced() {
        let limiter = RateLimiter::new(Duration::from_millis(30));
        let start = Instant::now();
        limiter.wait();
        limiter.wait();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn zero_interval_never_sleeps() {
        let limiter = RateLimiter::new(Duration::ZERO);
        limiter.wait();
        assert_eq!(limiter.wait(), Duration::ZERO);
    }
}
