//! Lightweight async request pacing between GitLab API calls.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep_until;

/// Enforces a minimum spacing between consecutive API requests so that
/// thread polling cannot hammer the server.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    cooldown: Duration,
    next_allowed: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Creates a limiter that keeps requests at least `cooldown` apart.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            next_allowed: Arc::new(Mutex::new(None)),
        }
    }

    /// Waits until the next request slot opens, then claims it.
    pub async fn acquire(&self) {
        let mut slot = self.next_allowed.lock().await;
        let now = Instant::now();
        if let Some(deadline) = *slot {
            if deadline > now {
                sleep_until(deadline.into()).await;
            }
        }
        *slot = Some(Instant::now() + self.cooldown);
    }

    /// Returns the configured cooldown interval.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

#[cfg(test)]
mod tests {
    use super::RateLimiter;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn cooldown_accessor_returns_configured_value() {
        let limiter = RateLimiter::new(Duration::from_millis(25));
        assert_eq!(limiter.cooldown(), Duration::from_millis(25));
    }

    #[tokio::test]
    async fn first_acquire_does_not_wait() {
        let limiter = RateLimiter::new(Duration::from_millis(200));
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn second_acquire_waits_for_cooldown_interval() {
        let limiter = RateLimiter::new(Duration::from_millis(40));

        limiter.acquire().await;
        let start = Instant::now();
        limiter.acquire().await;

        assert!(start.elapsed() >= Duration::from_millis(35));
    }
}
