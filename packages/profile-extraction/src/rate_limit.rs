//! Process-wide dispatch spacing.
//!
//! Backends rate-limit aggressively, so every dispatched call must be at
//! least a configured interval after the previous one, across all concurrent
//! orchestration runs. The spacer wraps a governor rate limiter with a
//! one-call burst; it is the only state shared between requests, and it is
//! injected rather than read from module-level globals so tests can drive it
//! with a fake clock.

use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;

// The middleware parameter must track the clock's instant type, or the
// generic impl below fails the limiter's bounds for any clock but the
// default one.
type DirectRateLimiter<C> = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    C,
    NoOpMiddleware<<C as Clock>::Instant>,
>;

/// Enforces minimum spacing between backend dispatches.
pub struct DispatchSpacer<C: Clock = DefaultClock> {
    limiter: DirectRateLimiter<C>,
    min_spacing: Duration,
}

impl DispatchSpacer<DefaultClock> {
    /// Create a spacer with the given minimum inter-dispatch interval.
    pub fn new(min_spacing: Duration) -> Self {
        let min_spacing = min_spacing.max(Duration::from_nanos(1));
        let quota = Quota::with_period(min_spacing)
            .expect("spacing must be > 0")
            .allow_burst(nonzero!(1u32));
        Self {
            limiter: RateLimiter::direct(quota),
            min_spacing,
        }
    }

    /// Create a spacer from a millisecond interval.
    pub fn from_millis(min_spacing_ms: u64) -> Self {
        Self::new(Duration::from_millis(min_spacing_ms))
    }

    /// Wait until a dispatch is permitted.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }
}

impl<C: Clock> DispatchSpacer<C> {
    /// Create a spacer driven by an explicit clock (for tests).
    pub fn with_clock(min_spacing: Duration, clock: C) -> Self {
        let min_spacing = min_spacing.max(Duration::from_nanos(1));
        let quota = Quota::with_period(min_spacing)
            .expect("spacing must be > 0")
            .allow_burst(nonzero!(1u32));
        Self {
            limiter: RateLimiter::direct_with_clock(quota, clock),
            min_spacing,
        }
    }

    /// Take a permit without waiting; false when the interval has not
    /// elapsed yet.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// The configured minimum interval.
    pub fn min_spacing(&self) -> Duration {
        self.min_spacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use governor::clock::FakeRelativeClock;
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn test_spacing_with_fake_clock() {
        let clock = FakeRelativeClock::default();
        // Clones share the underlying instant, so advancing `clock` moves
        // the spacer's clock too.
        let spacer = DispatchSpacer::with_clock(Duration::from_millis(100), clock.clone());

        assert!(spacer.try_acquire());
        assert!(!spacer.try_acquire());

        clock.advance(Duration::from_millis(50));
        assert!(!spacer.try_acquire());

        clock.advance(Duration::from_millis(50));
        assert!(spacer.try_acquire());
        assert!(!spacer.try_acquire());
    }

    #[test]
    fn test_no_burst_after_idle_period() {
        let clock = FakeRelativeClock::default();
        let spacer = DispatchSpacer::with_clock(Duration::from_millis(100), clock.clone());

        // A long idle period must not bank extra permits.
        clock.advance(Duration::from_secs(10));
        assert!(spacer.try_acquire());
        assert!(!spacer.try_acquire());
    }

    #[tokio::test]
    async fn test_sequential_acquires_are_spaced() {
        let spacer = DispatchSpacer::from_millis(50);
        let start = Instant::now();

        for _ in 0..4 {
            spacer.acquire().await;
        }

        // First is immediate, the next three wait 50ms each.
        assert!(
            start.elapsed() >= Duration::from_millis(150),
            "spacing not enforced: {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_concurrent_runs_share_the_spacer() {
        let spacer = Arc::new(DispatchSpacer::from_millis(40));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let spacer = spacer.clone();
            handles.push(tokio::spawn(async move {
                spacer.acquire().await;
                start.elapsed()
            }));
        }

        let mut stamps = Vec::new();
        for handle in handles {
            stamps.push(handle.await.unwrap());
        }
        stamps.sort();

        // Last permit cannot be earlier than three full intervals in.
        assert!(
            *stamps.last().unwrap() >= Duration::from_millis(120),
            "concurrent dispatches too close: {:?}",
            stamps
        );
    }
}
