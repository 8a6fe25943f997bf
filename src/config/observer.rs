//! # Observer configuration.
//!
//! [`ObserverConfig`] is the typed form of the keys a batching observer reads
//! under its prefix:
//!
//! | Key | Default |
//! |---|---|
//! | `threshold` | `TRACE` |
//! | `idleThreshold` | `PT5S` |
//! | `cooldownTime` | `PT15S` |
//! | `maximumWaitTime` | `PT1M` |
//! | `suppressMarkers` | none |
//! | `requireMarker` | none |
//! | `showRepeatsIndividually` | `false` |
//! | `repeatKey` | `full` (`full` or `template`) |
//! | `markers.<name>.throttle` | none |
//!
//! Every error is detected here, at setup; nothing is re-validated at flush time.

use std::sync::Arc;

use super::Configuration;
use crate::error::ConfigError;
use crate::event::{Level, Marker};
use crate::observers::{FilteredObserver, ObserverRef};
use crate::policies::{BatchPolicy, RepeatKey, ThrottleSchedule};

/// Typed observer settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObserverConfig {
    /// Name used for batchers and status records (the last prefix segment when parsed).
    pub name: Option<String>,
    /// Minimum level forwarded to the observer.
    pub threshold: Level,
    /// Batch timing.
    pub batch: BatchPolicy,
    /// Markers that are always dropped.
    pub suppress_markers: Vec<Marker>,
    /// Markers of which one must be present (empty = no requirement).
    pub require_markers: Vec<Marker>,
    /// Ask formatters to list repeats one by one.
    pub show_repeats_individually: bool,
    /// What counts as a repeat.
    pub repeat_key: RepeatKey,
    /// Escalating schedules per marker.
    pub marker_schedules: Vec<(Marker, ThrottleSchedule)>,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            name: None,
            threshold: Level::Trace,
            batch: BatchPolicy::default(),
            suppress_markers: Vec::new(),
            require_markers: Vec::new(),
            show_repeats_individually: false,
            repeat_key: RepeatKey::default(),
            marker_schedules: Vec::new(),
        }
    }
}

impl ObserverConfig {
    /// Reads every observer key from `config`.
    ///
    /// Does not call [`Configuration::check_for_unknown_fields`]: the caller
    /// does, after reading its own sink-specific keys (`url`, `channel`, …).
    pub fn parse(config: &Configuration<'_>) -> Result<Self, ConfigError> {
        let defaults = BatchPolicy::default();
        let batch = BatchPolicy {
            idle_threshold: config
                .duration("idleThreshold")?
                .unwrap_or(defaults.idle_threshold),
            cooldown_time: config
                .duration("cooldownTime")?
                .unwrap_or(defaults.cooldown_time),
            maximum_wait_time: config
                .duration("maximumWaitTime")?
                .unwrap_or(defaults.maximum_wait_time),
        };

        let repeat_key = match config.optional_string("repeatKey") {
            None => RepeatKey::default(),
            Some(v) if v.eq_ignore_ascii_case("full") => RepeatKey::Full,
            Some(v) if v.eq_ignore_ascii_case("template") => RepeatKey::Template,
            Some(v) => {
                return Err(ConfigError::InvalidValue {
                    key: config.full_key("repeatKey"),
                    value: v,
                    expected: "full, template",
                })
            }
        };

        let mut marker_schedules = Vec::new();
        for name in config.group_names("markers", "throttle") {
            let key = format!("markers.{name}.throttle");
            let value = config.optional_string(&key).unwrap_or_default();
            let schedule = ThrottleSchedule::parse(&name, &config.full_key(&key), &value)?;
            marker_schedules.push((Marker::new(&name), schedule));
        }

        let name = config
            .prefix()
            .trim_end_matches('.')
            .rsplit('.')
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            name,
            threshold: config.level("threshold")?.unwrap_or(Level::Trace),
            batch,
            suppress_markers: config.markers("suppressMarkers"),
            require_markers: config.markers("requireMarker"),
            show_repeats_individually: config.boolean("showRepeatsIndividually")?,
            repeat_key,
            marker_schedules,
        })
    }

    /// Sets the name.
    #[inline]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the threshold.
    #[inline]
    pub fn with_threshold(mut self, level: Level) -> Self {
        self.threshold = level;
        self
    }

    /// Sets the batch timing.
    #[inline]
    pub fn with_batch(mut self, batch: BatchPolicy) -> Self {
        self.batch = batch;
        self
    }

    /// Adds an escalating schedule for `marker`.
    #[inline]
    pub fn with_marker_schedule(mut self, marker: Marker, schedule: ThrottleSchedule) -> Self {
        self.marker_schedules.push((marker, schedule));
        self
    }

    /// Wraps `inner` in the threshold and marker rules of this config.
    pub fn filter(&self, inner: ObserverRef) -> FilteredObserver {
        FilteredObserver::new(inner)
            .with_threshold(self.threshold)
            .with_suppress_markers(self.suppress_markers.iter().cloned())
            .with_require_markers(self.require_markers.iter().cloned())
    }

    /// [`filter`](Self::filter) as a shared handle.
    pub fn filtered(&self, inner: ObserverRef) -> ObserverRef {
        Arc::new(self.filter(inner))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::Properties;

    fn mins(m: u64) -> Duration {
        Duration::from_secs(m * 60)
    }

    #[test]
    fn test_defaults_when_empty() {
        let props = Properties::new();
        let cfg = ObserverConfig::parse(&Configuration::new(&props, "observer.slack"))
            .expect("parses");
        assert_eq!(cfg.threshold, Level::Trace);
        assert_eq!(cfg.batch, BatchPolicy::default());
        assert_eq!(cfg.name.as_deref(), Some("slack"));
        assert!(cfg.marker_schedules.is_empty());
    }

    #[test]
    fn test_full_configuration() {
        let props = Properties::new()
            .with("observer.slack.threshold", "WARN")
            .with("observer.slack.idleThreshold", "PT3S")
            .with("observer.slack.cooldownTime", "PT5S")
            .with("observer.slack.maximumWaitTime", "PT3M")
            .with("observer.slack.suppressMarkers", "NOISY")
            .with("observer.slack.requireMarker", "OPS, AUDIT")
            .with("observer.slack.showRepeatsIndividually", "true")
            .with("observer.slack.repeatKey", "template")
            .with("observer.slack.markers.AUDIT.throttle", "PT1M PT10M PT30M");
        let config = Configuration::new(&props, "observer.slack");
        let cfg = ObserverConfig::parse(&config).expect("parses");
        config.check_for_unknown_fields().expect("all keys read");

        assert_eq!(cfg.threshold, Level::Warn);
        assert_eq!(cfg.batch.idle_threshold, Duration::from_secs(3));
        assert_eq!(cfg.batch.cooldown_time, Duration::from_secs(5));
        assert_eq!(cfg.batch.maximum_wait_time, mins(3));
        assert_eq!(cfg.suppress_markers, vec![Marker::new("NOISY")]);
        assert_eq!(cfg.require_markers.len(), 2);
        assert!(cfg.show_repeats_individually);
        assert_eq!(cfg.repeat_key, RepeatKey::Template);
        let (marker, schedule) = &cfg.marker_schedules[0];
        assert_eq!(marker.name(), "AUDIT");
        assert_eq!(schedule.steps(), &[mins(1), mins(10), mins(30)]);
    }

    #[test]
    fn test_empty_schedule_is_rejected() {
        let props = Properties::new().with("o.markers.AUDIT.throttle", "   ");
        let err = ObserverConfig::parse(&Configuration::new(&props, "o")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::EmptySchedule {
                marker: "AUDIT".into()
            }
        );
    }

    #[test]
    fn test_malformed_schedule_duration_is_rejected() {
        let props = Properties::new().with("o.markers.AUDIT.throttle", "PT1M ten-minutes");
        let err = ObserverConfig::parse(&Configuration::new(&props, "o")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidDuration {
                key: "o.markers.AUDIT.throttle".into(),
                value: "ten-minutes".into(),
            }
        );
    }

    #[test]
    fn test_invalid_repeat_key() {
        let props = Properties::new().with("o.repeatKey", "fuzzy");
        let err = ObserverConfig::parse(&Configuration::new(&props, "o")).unwrap_err();
        assert_eq!(err.as_label(), "config_invalid_value");
    }
}
