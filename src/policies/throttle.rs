//! # Escalating throttle schedule for markers.
//!
//! [`ThrottleSchedule`] is a non-empty list of cooldowns. Each consecutive
//! flush for a marker moves one step further along the list and the last
//! entry repeats forever:
//!
//! ```text
//! schedule = [1m, 10m, 30m]
//! flush #1 → cooldown 1m
//! flush #2 → cooldown 10m     (no quiet period in between)
//! flush #3 → cooldown 30m
//! flush #4 → cooldown 30m     (capped at the last entry)
//! quiet ≥ current cooldown → next flush starts over at 1m
//! ```
//!
//! Unlike a multiplicative backoff the steps are listed explicitly, so the
//! delay for step `n` is simply `steps[min(n, len - 1)]`.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use logvisor::ThrottleSchedule;
//!
//! let schedule: ThrottleSchedule = "PT1M PT10M PT30M".parse().unwrap();
//! assert_eq!(schedule.cooldown(0), Duration::from_secs(60));
//! assert_eq!(schedule.cooldown(1), Duration::from_secs(600));
//! assert_eq!(schedule.cooldown(9), Duration::from_secs(1800));
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::duration::{format_duration, parse_duration};
use crate::error::ConfigError;

/// Non-empty list of escalating cooldowns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThrottleSchedule {
    steps: Vec<Duration>,
}

impl ThrottleSchedule {
    /// Builds a schedule from explicit steps.
    ///
    /// Fails with [`ConfigError::EmptySchedule`] when `steps` is empty; `marker`
    /// only labels the error.
    pub fn new(marker: &str, steps: Vec<Duration>) -> Result<Self, ConfigError> {
        if steps.is_empty() {
            return Err(ConfigError::EmptySchedule {
                marker: marker.to_string(),
            });
        }
        Ok(Self { steps })
    }

    /// Parses a space-separated list of ISO-8601 durations.
    ///
    /// `key` and `marker` label the errors: [`ConfigError::InvalidDuration`]
    /// for a malformed entry, [`ConfigError::EmptySchedule`] for a blank value.
    pub fn parse(marker: &str, key: &str, value: &str) -> Result<Self, ConfigError> {
        let steps = value
            .split_whitespace()
            .map(|literal| {
                parse_duration(literal).ok_or_else(|| ConfigError::InvalidDuration {
                    key: key.to_string(),
                    value: literal.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(marker, steps)
    }

    /// Cooldown for escalation step `step` (0-indexed), capped at the last entry.
    pub fn cooldown(&self, step: usize) -> Duration {
        self.steps[step.min(self.steps.len() - 1)]
    }

    /// Step after `step`, capped at the last index.
    pub fn next_step(&self, step: usize) -> usize {
        (step + 1).min(self.steps.len() - 1)
    }

    /// Number of distinct steps (always ≥ 1).
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always `false`; a schedule cannot be empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All steps in order.
    pub fn steps(&self) -> &[Duration] {
        &self.steps
    }
}

impl FromStr for ThrottleSchedule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse("<unnamed>", "throttle", s)
    }
}

impl fmt::Display for ThrottleSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(&format_duration(*step))?;
        }
        Ok(())
    }
}
