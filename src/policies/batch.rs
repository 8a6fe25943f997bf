//! # Batch timing policy.
//!
//! Provides [`BatchPolicy`], the three knobs of the batching state machine:
//!
//! - `idle_threshold`: quiet period after the latest event that triggers a flush
//! - `cooldown_time`: minimum spacing after a flush before the next one
//! - `maximum_wait_time`: hard cap on how long a batch may stay open
//!
//! ## Flush deadline
//! ```text
//! inside a cooldown:  flush_at = last_flush + cooldown
//! otherwise:          flush_at = last_event + idle_threshold
//! and independently:  first_event + maximum_wait_time
//! ```

use std::time::Duration;

/// Timing policy for one batcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchPolicy {
    /// Quiet period that triggers a flush.
    ///
    /// Re-armed on every event, so a steady burst keeps the batch open.
    pub idle_threshold: Duration,

    /// Minimum spacing between the end of one flush and the next flush.
    ///
    /// Events arriving inside the cooldown are buffered and flushed when it
    /// ends, never immediately.
    pub cooldown_time: Duration,

    /// Upper bound on how long a batch stays open, measured from its first event.
    ///
    /// Not reset by new events; cancelled only by a flush.
    pub maximum_wait_time: Duration,
}

impl BatchPolicy {
    /// Sets the idle threshold.
    pub fn with_idle_threshold(mut self, d: Duration) -> Self {
        self.idle_threshold = d;
        self
    }

    /// Sets the cooldown.
    pub fn with_cooldown_time(mut self, d: Duration) -> Self {
        self.cooldown_time = d;
        self
    }

    /// Sets the maximum wait.
    pub fn with_maximum_wait_time(mut self, d: Duration) -> Self {
        self.maximum_wait_time = d;
        self
    }
}

impl Default for BatchPolicy {
    /// Default policy:
    ///
    /// - `idle_threshold = 5s`
    /// - `cooldown_time = 15s`
    /// - `maximum_wait_time = 1min`
    fn default() -> Self {
        Self {
            idle_threshold: Duration::from_secs(5),
            cooldown_time: Duration::from_secs(15),
            maximum_wait_time: Duration::from_secs(60),
        }
    }
}
