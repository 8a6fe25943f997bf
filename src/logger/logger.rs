//! # Logger handles.
//!
//! A [`Logger`] is a cheap, cloneable handle (`name` + registry). Every call
//! first checks [`Logger::is_enabled`]; only then are arguments rendered and a
//! [`LogEvent`] built, stamped with thread, time and context properties, and
//! dispatched.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use logvisor::{Level, LoggerRegistry, Marker, NullObserver, StatusChannel};
//!
//! let registry = LoggerRegistry::new(Arc::new(NullObserver), Arc::new(StatusChannel::new(16)));
//! let log = registry.logger("com.example.billing");
//!
//! log.warn("charge {} failed for {}", &[&42, &"alice"]);
//!
//! log.at(Level::Error)
//!     .marker(Marker::new("PAYMENT"))
//!     .arg(42)
//!     .property("request", "7f3a")
//!     .log("charge {} failed");
//! ```

use std::error::Error;
use std::fmt::{self, Display};
use std::sync::Arc;

use super::LoggerRegistry;
use crate::event::{ErrorPayload, Level, LogEvent, Marker};

/// Named entry point for emitting events.
#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    registry: Arc<LoggerRegistry>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("name", &self.name).finish()
    }
}

impl Logger {
    pub(crate) fn new(name: Arc<str>, registry: Arc<LoggerRegistry>) -> Self {
        Self { name, registry }
    }

    /// Normalized name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Effective threshold.
    pub fn threshold(&self) -> Level {
        self.registry.resolve_threshold(&self.name)
    }

    /// True if an event at `level` would be built and dispatched.
    #[inline]
    pub fn is_enabled(&self, level: Level) -> bool {
        self.registry.is_enabled(&self.name, level)
    }

    /// Logs `template` with `args` at `level`.
    pub fn log(&self, level: Level, template: &str, args: &[&dyn Display]) {
        if !self.is_enabled(level) {
            return;
        }
        let event = LogEvent::new(Arc::clone(&self.name), level, template)
            .with_args(args.iter().map(|a| a.to_string()));
        self.emit(event);
    }

    /// Dispatches an already built event if its level is enabled here.
    pub fn log_event(&self, event: LogEvent) {
        if self.is_enabled(event.level) {
            self.emit(event);
        }
    }

    fn emit(&self, event: LogEvent) {
        self.registry.dispatch(&self.name, &event.into_ref());
    }

    /// Logs at ERROR.
    pub fn error(&self, template: &str, args: &[&dyn Display]) {
        self.log(Level::Error, template, args);
    }

    /// Logs at WARN.
    pub fn warn(&self, template: &str, args: &[&dyn Display]) {
        self.log(Level::Warn, template, args);
    }

    /// Logs at INFO.
    pub fn info(&self, template: &str, args: &[&dyn Display]) {
        self.log(Level::Info, template, args);
    }

    /// Logs at DEBUG.
    pub fn debug(&self, template: &str, args: &[&dyn Display]) {
        self.log(Level::Debug, template, args);
    }

    /// Logs at TRACE.
    pub fn trace(&self, template: &str, args: &[&dyn Display]) {
        self.log(Level::Trace, template, args);
    }

    /// Starts a fluent event at `level`.
    ///
    /// When the level is disabled the builder records nothing and
    /// [`EventBuilder::log`] is a no-op.
    pub fn at(&self, level: Level) -> EventBuilder<'_> {
        EventBuilder {
            logger: self,
            level,
            enabled: self.is_enabled(level),
            marker: None,
            args: Vec::new(),
            error: None,
            properties: Vec::new(),
        }
    }
}

/// Fluent event under construction.
#[must_use = "call .log(template) to emit the event"]
pub struct EventBuilder<'a> {
    logger: &'a Logger,
    level: Level,
    enabled: bool,
    marker: Option<Marker>,
    args: Vec<String>,
    error: Option<ErrorPayload>,
    properties: Vec<(String, String)>,
}

impl EventBuilder<'_> {
    /// True if the event will be emitted.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Tags the event with a marker.
    pub fn marker(mut self, marker: Marker) -> Self {
        if self.enabled {
            self.marker = Some(marker);
        }
        self
    }

    /// Appends an argument.
    pub fn arg(mut self, arg: impl Display) -> Self {
        if self.enabled {
            self.args.push(arg.to_string());
        }
        self
    }

    /// Attaches an error.
    pub fn error(mut self, error: impl Error + Send + Sync + 'static) -> Self {
        if self.enabled {
            self.error = Some(Arc::new(error));
        }
        self
    }

    /// Adds a context property for this event only.
    pub fn property(mut self, key: impl Into<String>, value: impl Display) -> Self {
        if self.enabled {
            self.properties.push((key.into(), value.to_string()));
        }
        self
    }

    /// Builds and dispatches the event.
    pub fn log(self, template: &str) {
        if !self.enabled {
            return;
        }
        let mut event =
            LogEvent::new(Arc::clone(&self.logger.name), self.level, template).with_args(self.args);
        if let Some(marker) = self.marker {
            event = event.with_marker(marker);
        }
        if let Some(error) = self.error {
            event = event.with_error(error);
        }
        for (k, v) in self.properties {
            event = event.with_property(k, v);
        }
        self.logger.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::event::LogEventRef;
    use crate::observers::ObserverFn;
    use crate::status::StatusChannel;

    type Seen = Arc<Mutex<Vec<LogEventRef>>>;

    fn setup() -> (Arc<LoggerRegistry>, Seen) {
        let seen: Seen = Arc::default();
        let sink = Arc::clone(&seen);
        let reg = LoggerRegistry::new(
            ObserverFn::arc("capture", move |ev: &LogEventRef| sink.lock().push(Arc::clone(ev))),
            Arc::new(StatusChannel::new(16)),
        );
        (reg, seen)
    }

    struct Counted<'a>(&'a AtomicUsize);

    impl Display for Counted<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0.fetch_add(1, Ordering::SeqCst);
            f.write_str("counted")
        }
    }

    #[test]
    fn test_disabled_level_builds_nothing() {
        let (reg, seen) = setup();
        let log = reg.logger("app");
        let renders = AtomicUsize::new(0);

        assert!(!log.is_enabled(Level::Debug));
        log.debug("value {}", &[&Counted(&renders)]);
        log.at(Level::Debug).arg(Counted(&renders)).log("value {}");

        assert_eq!(renders.load(Ordering::SeqCst), 0);
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_enabled_level_dispatches() {
        let (reg, seen) = setup();
        let log = reg.logger("app.billing");
        log.warn("charge {} failed for {}", &[&42, &"alice"]);

        let events = seen.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message(), "charge 42 failed for alice");
        assert_eq!(&*events[0].logger, "app.billing");
        assert_eq!(events[0].level, Level::Warn);
    }

    #[test]
    fn test_fluent_builder() {
        let (reg, seen) = setup();
        let log = reg.logger("app");
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        log.at(Level::Error)
            .marker(Marker::new("PAYMENT"))
            .arg("42")
            .error(io)
            .property("request", "7f3a")
            .log("charge {} failed");

        let events = seen.lock();
        let ev = &events[0];
        assert_eq!(ev.message(), "charge 42 failed");
        assert!(ev.has_marker(&Marker::new("PAYMENT")));
        assert_eq!(ev.error.as_ref().map(|e| e.to_string()).as_deref(), Some("timed out"));
        assert_eq!(ev.mdc.get("request").map(String::as_str), Some("7f3a"));
    }

    #[test]
    fn test_threshold_change_applies_immediately() {
        let (reg, seen) = setup();
        let log = reg.logger("app.db");
        log.debug("hidden", &[]);
        reg.set_threshold("app", Level::Debug);
        log.debug("shown", &[]);
        assert_eq!(log.threshold(), Level::Debug);

        let events = seen.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(&*events[0].template, "shown");
    }
}
