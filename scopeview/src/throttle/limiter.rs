//! Latest-wins rate limiter.

use std::time::Duration;

use tokio::time::Instant;

/// Coalesces a stream of values to at most one delivery per interval.
///
/// A value offered after the interval has elapsed is delivered at once.
/// Otherwise it replaces any pending value and is released by
/// [`RateLimiter::poll`] once the interval is up. The caller supplies the
/// clock so behavior is deterministic under test.
#[derive(Debug)]
pub struct RateLimiter<T> {
    min_interval: Duration,
    last_delivery: Option<Instant>,
    pending: Option<T>,
    coalesced: u64,
}

impl<T> RateLimiter<T> {
    /// Limit to `rate_hz` deliveries per second.
    ///
    /// A non-positive or non-finite rate disables limiting.
    pub fn new(rate_hz: f64) -> Self {
        let min_interval = if rate_hz.is_finite() && rate_hz > 0.0 {
            Duration::from_secs_f64(1.0 / rate_hz)
        } else {
            Duration::ZERO
        };
        Self::with_interval(min_interval)
    }

    pub fn with_interval(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_delivery: None,
            pending: None,
            coalesced: 0,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Offer a new value. Returns it if it may be delivered now.
    pub fn offer(&mut self, value: T, now: Instant) -> Option<T> {
        if self.pending.is_some() {
            self.coalesced += 1;
        }
        if self.is_due(now) {
            self.pending = None;
            self.last_delivery = Some(now);
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Release the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_some() && self.is_due(now) {
            self.last_delivery = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    /// When the pending value becomes due, if there is one.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref()?;
        Some(match self.last_delivery {
            Some(last) => last + self.min_interval,
            None => Instant::now(),
        })
    }

    /// Take the pending value regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Values replaced before they were delivered.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }

    fn is_due(&self, now: Instant) -> bool {
        match self.last_delivery {
            Some(last) => now.saturating_duration_since(last) >= self.min_interval,
            None => true,
        }
    }
}
