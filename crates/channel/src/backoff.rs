//! Bounded backoff policy for reconnection.

use std::time::Duration;

/// Reconnection backoff configuration.
///
/// Attempt numbering starts at 1. The delay grows exponentially from
/// `base_delay`, capped at `max_delay`, and the channel gives up after
/// `max_attempts` consecutive failures. A successful reconnect resets the
/// attempt counter.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Maximum consecutive failed attempts before the channel closes.
    pub max_attempts: u32,
    /// Delay before the first reconnect attempt.
    pub base_delay: Duration,
    /// Cap for the exponential growth.
    pub max_delay: Duration,
    /// Growth factor between attempts.
    pub multiplier: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(3),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl ReconnectPolicy {
    /// Returns the delay to wait before the given attempt (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return self.base_delay;
        }

        let millis =
            self.base_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32 - 1);
        let delay = Duration::from_millis(millis as u64);

        delay.min(self.max_delay)
    }

    /// Returns true if another attempt is allowed after `attempt` failures.
    pub fn allows_attempt(&self, attempt: u32) -> bool {
        attempt <= self.max_attempts
    }
}
