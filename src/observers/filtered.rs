//! # Level and marker filter.
//!
//! [`FilteredObserver`] forwards an event to its inner observer iff
//!
//! ```text
//! level >= threshold
//!   AND marker ∉ suppress
//!   AND (require = ∅ OR marker ∈ require)
//! ```
//!
//! An event without a marker passes the suppress check and fails any
//! non-empty require set.

use std::collections::HashSet;

use super::{Observer, ObserverRef};
use crate::event::{Level, LogEvent, LogEventRef, Marker};

/// Wraps an observer with a level threshold and marker rules.
pub struct FilteredObserver {
    inner: ObserverRef,
    threshold: Level,
    suppress: HashSet<Marker>,
    require: HashSet<Marker>,
}

impl FilteredObserver {
    /// Passes everything (threshold TRACE, no marker rules) until configured.
    pub fn new(inner: ObserverRef) -> Self {
        Self {
            inner,
            threshold: Level::Trace,
            suppress: HashSet::new(),
            require: HashSet::new(),
        }
    }

    /// Minimum level to forward.
    #[inline]
    pub fn with_threshold(mut self, threshold: Level) -> Self {
        self.threshold = threshold;
        self
    }

    /// Markers that are always dropped.
    #[inline]
    pub fn with_suppress_markers(mut self, markers: impl IntoIterator<Item = Marker>) -> Self {
        self.suppress.extend(markers);
        self
    }

    /// Markers of which one must be present.
    #[inline]
    pub fn with_require_markers(mut self, markers: impl IntoIterator<Item = Marker>) -> Self {
        self.require.extend(markers);
        self
    }

    /// Minimum level.
    pub fn threshold(&self) -> Level {
        self.threshold
    }

    /// Wrapped observer.
    pub fn inner(&self) -> &ObserverRef {
        &self.inner
    }

    /// True if `event` would be forwarded.
    pub fn accepts(&self, event: &LogEvent) -> bool {
        if event.level < self.threshold {
            return false;
        }
        match &event.marker {
            Some(m) => {
                !self.suppress.contains(m) && (self.require.is_empty() || self.require.contains(m))
            }
            None => self.require.is_empty(),
        }
    }
}

impl Observer for FilteredObserver {
    fn log_event(&self, event: &LogEventRef) {
        if self.accepts(event) {
            self.inner.log_event(event);
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn describe(&self) -> String {
        let mut parts = vec![format!("threshold={}", self.threshold)];
        if !self.suppress.is_empty() {
            parts.push(format!("suppress={}", sorted(&self.suppress)));
        }
        if !self.require.is_empty() {
            parts.push(format!("require={}", sorted(&self.require)));
        }
        format!("Filtered{{{}}}({})", parts.join(","), self.inner.describe())
    }
}

fn sorted(markers: &HashSet<Marker>) -> String {
    let mut names: Vec<&str> = markers.iter().map(Marker::name).collect();
    names.sort_unstable();
    names.join("|")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::observers::NullObserver;

    fn ev(level: Level, marker: Option<&str>) -> LogEvent {
        let e = LogEvent::new("x", level, "m");
        match marker {
            Some(m) => e.with_marker(Marker::new(m)),
            None => e,
        }
    }

    #[test]
    fn test_threshold() {
        let f = FilteredObserver::new(Arc::new(NullObserver)).with_threshold(Level::Warn);
        assert!(!f.accepts(&ev(Level::Info, None)));
        assert!(f.accepts(&ev(Level::Warn, None)));
        assert!(f.accepts(&ev(Level::Error, None)));
    }

    #[test]
    fn test_suppress_markers() {
        let f = FilteredObserver::new(Arc::new(NullObserver))
            .with_suppress_markers([Marker::new("NOISY")]);
        assert!(!f.accepts(&ev(Level::Error, Some("NOISY"))));
        assert!(f.accepts(&ev(Level::Error, Some("OTHER"))));
        assert!(f.accepts(&ev(Level::Error, None)));
    }

    #[test]
    fn test_require_markers() {
        let f = FilteredObserver::new(Arc::new(NullObserver))
            .with_require_markers([Marker::new("AUDIT"), Marker::new("SECURITY")]);
        assert!(f.accepts(&ev(Level::Info, Some("AUDIT"))));
        assert!(f.accepts(&ev(Level::Info, Some("SECURITY"))));
        assert!(!f.accepts(&ev(Level::Info, Some("OTHER"))));
        assert!(!f.accepts(&ev(Level::Info, None)));
    }

    #[test]
    fn test_suppress_wins_over_require() {
        let m = Marker::new("AUDIT");
        let f = FilteredObserver::new(Arc::new(NullObserver))
            .with_require_markers([m.clone()])
            .with_suppress_markers([m]);
        assert!(!f.accepts(&ev(Level::Error, Some("AUDIT"))));
    }

    #[test]
    fn test_describe() {
        let f = FilteredObserver::new(Arc::new(NullObserver))
            .with_threshold(Level::Warn)
            .with_suppress_markers([Marker::new("B"), Marker::new("A")]);
        assert_eq!(f.describe(), "Filtered{threshold=WARN,suppress=A|B}(null)");
    }
}
