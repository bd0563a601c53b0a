//! Backoff and pacing policies: decide how long the drain loop sleeps.

use std::time::Duration;

use rand::Rng;

/// Upper bound on the backoff exponent. Keeps the delay finite for a deep
/// queue (2^16 s at the default base, roughly 18 hours); below this depth
/// the computed delay is exactly the uncapped formula.
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// What the backoff exponent is keyed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffKey {
    /// Queue length after the failed item is reinserted at the head, so the
    /// delay grows with how much work is pending, not with the failing
    /// item's own history.
    QueueDepth,

    /// The failing item's own attempt count.
    Attempts,
}

/// Backoff policy for failed attempts.
///
/// delay = base_delay * multiplier^exponent, where the exponent comes from
/// [`BackoffKey`]. The default (1s base, 2.0 multiplier, queue-depth key)
/// yields 2s at depth 1, 8s at depth 3, 16s at depth 4.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    pub base_delay: Duration,
    pub multiplier: f64,
    pub key: BackoffKey,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            multiplier: 2.0,
            key: BackoffKey::QueueDepth,
        }
    }
}

impl BackoffPolicy {
    /// Delay before the next attempt of the item that just failed.
    ///
    /// `queue_depth` is the pending count after reinsertion (so >= 1);
    /// `attempts` is the failing item's own attempt count. Which one feeds
    /// the exponent depends on `self.key`.
    pub fn delay(&self, queue_depth: usize, attempts: u32) -> Duration {
        let exponent = match self.key {
            BackoffKey::QueueDepth => queue_depth.min(MAX_BACKOFF_EXPONENT as usize) as i32,
            BackoffKey::Attempts => attempts.min(MAX_BACKOFF_EXPONENT) as i32,
        };
        let delay_secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::from_secs_f64(delay_secs)
    }
}

/// Pacing policy: a randomized delay after every successful execution (never
/// after a failure), so a burst of submissions still reaches the downstream
/// API at a throttled rate.
#[derive(Debug, Clone)]
pub struct PacingPolicy {
    pub min: Duration,
    pub max: Duration,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(1500),
            max: Duration::from_millis(3500),
        }
    }
}

impl PacingPolicy {
    /// Uniform random delay in `[min, max)`.
    pub fn delay(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let span_ms = (self.max - self.min).as_millis() as u64;
        self.min + Duration::from_millis(rand::thread_rng().gen_range(0..span_ms))
    }
}
