//! Request pacing for the speech endpoint.

use std::time::Duration;
use tokio::time::{self, Interval, MissedTickBehavior};

/// A gate that releases at most one permit per fixed interval.
///
/// The first permit is available immediately. A caller that falls behind gets
/// one outstanding permit, never a burst.
#[derive(Debug)]
pub struct RateLimiter {
    /// Spacing between permits; `None` when disabled
    period: Option<Duration>,
    /// Created on first use so construction needs no runtime
    ticker: Option<Interval>,
}

impl RateLimiter {
    /// Create a limiter for `calls_per_minute`; zero disables it.
    pub fn new(calls_per_minute: u32) -> Self {
        let period = (calls_per_minute > 0).then(|| Duration::from_secs(60) / calls_per_minute);
        Self {
            period,
            ticker: None,
        }
    }

    /// Minimum spacing between permits.
    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// Wait until the next permit is available.
    pub async fn acquire(&mut self) {
        let Some(period) = self.period else {
            return;
        };

        let ticker = self.ticker.get_or_insert_with(|| {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        ticker.tick().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn test_period_from_calls_per_minute() {
        assert_eq!(RateLimiter::new(60).period(), Some(Duration::from_secs(1)));
        assert_eq!(RateLimiter::new(3).period(), Some(Duration::from_secs(20)));
        assert_eq!(RateLimiter::new(0).period(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_never_blocks() {
        let mut limiter = RateLimiter::new(0);
        let start = Instant::now();

        for _ in 0..1000 {
            limiter.acquire().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permits_are_spaced() {
        let mut limiter = RateLimiter::new(30);
        let period = Duration::from_secs(2);

        let mut issued = Vec::new();
        for _ in 0..5 {
            limiter.acquire().await;
            issued.push(Instant::now());
        }

        for pair in issued.windows(2) {
            assert!(pair[1] - pair[0] >= period, "permits {:?} apart", pair[1] - pair[0]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_permit_is_immediate() {
        let mut limiter = RateLimiter::new(1);
        let start = Instant::now();
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_caller_does_not_burst() {
        let mut limiter = RateLimiter::new(60);
        limiter.acquire().await;

        // Simulate a request that takes far longer than the period
        time::sleep(Duration::from_secs(10)).await;

        let before = Instant::now();
        limiter.acquire().await;
        let caught_up = Instant::now();
        limiter.acquire().await;
        let after = Instant::now();

        assert_eq!(caught_up - before, Duration::ZERO);
        assert!(after - caught_up >= Duration::from_secs(1));
    }
}
