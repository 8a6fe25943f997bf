//! # Log events.
//!
//! A [`LogEvent`] is the immutable record of one log call that passed its
//! level check. It is shared as [`LogEventRef`] (`Arc<LogEvent>`) so that
//! fan-out and batching never copy it.
//!
//! ## Ordering guarantees
//! Each event gets a process-wide sequence number (`seq`) that increases
//! monotonically in creation order.
//!
//! ## Example
//! ```rust
//! use logvisor::{Level, LogEvent, Marker};
//!
//! let ev = LogEvent::new("com.example.Billing", Level::Warn, "charge {} failed for {}")
//!     .with_marker(Marker::new("PAYMENT"))
//!     .with_args(["42", "alice"]);
//!
//! assert_eq!(ev.message(), "charge 42 failed for alice");
//! assert_eq!(ev.marker.as_ref().map(|m| m.name()), Some("PAYMENT"));
//! ```

use std::collections::BTreeMap;
use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{mdc, Level, Marker};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Shared, immutable event handle.
pub type LogEventRef = Arc<LogEvent>;

/// Error payload attached to an event.
pub type ErrorPayload = Arc<dyn Error + Send + Sync + 'static>;

/// One log call and its context.
#[derive(Clone, Debug)]
pub struct LogEvent {
    /// Process-wide sequence number (creation order).
    pub seq: u64,
    /// Name of the logger the call was made on.
    pub logger: Arc<str>,
    /// Severity.
    pub level: Level,
    /// Optional category.
    pub marker: Option<Marker>,
    /// Message template with `{}` placeholders.
    pub template: Arc<str>,
    /// Arguments, rendered with `Display` at call time.
    pub args: Vec<String>,
    /// Thread name, or thread id when the thread is unnamed.
    pub thread: String,
    /// Wall-clock creation time.
    pub timestamp: DateTime<Utc>,
    /// Optional error payload.
    pub error: Option<ErrorPayload>,
    /// Snapshot of the thread's context properties at call time.
    pub mdc: BTreeMap<String, String>,
}

impl LogEvent {
    /// Creates an event stamped with the current time, thread and context properties.
    pub fn new(logger: impl Into<Arc<str>>, level: Level, template: impl Into<Arc<str>>) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            logger: logger.into(),
            level,
            marker: None,
            template: template.into(),
            args: Vec::new(),
            thread: current_thread_label(),
            timestamp: Utc::now(),
            error: None,
            mdc: mdc::snapshot(),
        }
    }

    /// Attaches a marker.
    #[inline]
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Replaces the argument list.
    #[inline]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Attaches an error payload.
    #[inline]
    pub fn with_error(mut self, error: ErrorPayload) -> Self {
        self.error = Some(error);
        self
    }

    /// Overrides the timestamp.
    #[inline]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Overrides the thread label.
    #[inline]
    pub fn with_thread(mut self, thread: impl Into<String>) -> Self {
        self.thread = thread.into();
        self
    }

    /// Adds a context property to this event only.
    #[inline]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.mdc.insert(key.into(), value.into());
        self
    }

    /// Wraps the event in an [`Arc`].
    #[inline]
    pub fn into_ref(self) -> LogEventRef {
        Arc::new(self)
    }

    /// Renders the template, substituting `{}` placeholders with arguments in order.
    ///
    /// Surplus placeholders are kept verbatim; surplus arguments are ignored.
    pub fn message(&self) -> String {
        render_template(&self.template, &self.args)
    }

    /// True when the event carries `marker`.
    #[inline]
    pub fn has_marker(&self, marker: &Marker) -> bool {
        self.marker.as_ref() == Some(marker)
    }

    /// Last segment of the logger name (`"com.example.Billing"` → `"Billing"`).
    pub fn logger_short_name(&self) -> &str {
        self.logger.rsplit('.').next().unwrap_or(&self.logger)
    }
}

/// Substitutes `{}` placeholders in `template` with `args` in order.
pub fn render_template(template: &str, args: &[String]) -> String {
    render_with(template, args, |out, arg| out.push_str(arg))
}

/// Like [`render_template`], with a custom writer for each substituted argument.
pub(crate) fn render_with(
    template: &str,
    args: &[String],
    mut write_arg: impl FnMut(&mut String, &str),
) -> String {
    let mut out = String::with_capacity(template.len() + args.iter().map(String::len).sum::<usize>());
    let mut args = args.iter();
    let mut rest = template;
    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        match args.next() {
            Some(arg) => write_arg(&mut out, arg),
            None => out.push_str("{}"),
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

fn current_thread_label() -> String {
    let current = std::thread::current();
    match current.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", current.id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_substitutes_in_order() {
        let ev = LogEvent::new("a", Level::Info, "{} + {} = {}").with_args(["1", "2", "3"]);
        assert_eq!(ev.message(), "1 + 2 = 3");
    }

    #[test]
    fn test_message_keeps_surplus_placeholders() {
        let ev = LogEvent::new("a", Level::Info, "x={} y={}").with_args(["1"]);
        assert_eq!(ev.message(), "x=1 y={}");
    }

    #[test]
    fn test_seq_is_monotonic() {
        let a = LogEvent::new("a", Level::Info, "first");
        let b = LogEvent::new("a", Level::Info, "second");
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_captures_mdc_snapshot() {
        mdc::clear();
        mdc::put("user", "alice");
        let ev = LogEvent::new("a", Level::Info, "hello");
        mdc::put("user", "bob");
        assert_eq!(ev.mdc.get("user").map(String::as_str), Some("alice"));
        mdc::clear();
    }

    #[test]
    fn test_short_name() {
        let ev = LogEvent::new("com.example.Billing", Level::Info, "x");
        assert_eq!(ev.logger_short_name(), "Billing");
    }
}
