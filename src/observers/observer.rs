//! # Observer: consumers of log events
//!
//! The [`Observer`] trait is the extension point every sink, filter and
//! fan-out implements. Loggers resolve one observer per call and hand it the
//! event; what happens next (filtering, printing, batching) is up to the
//! observer.
//!
//! # High-level architecture:
//! ```text
//!   Logger::log() ── is_enabled? ──► LogEvent ──► Observer::log_event(&event)
//!                                                     │
//!              ┌──────────────────────────────────────┼───────────────────────┐
//!              ▼                                      ▼                       ▼
//!        ConsoleObserver                     FilteredObserver          CompositeObserver
//!          (stdout)                       (level / marker rules)        (fan-out, isolation)
//!                                                     │
//!                                                     ▼
//!                                            BatchingObserver ──► Batcher ──► BatchProcessor
//! ```
//!
//! ## Rules
//! - `log_event` must not block on I/O; sinks that talk to the network batch.
//! - Failures are reported to the status channel, never returned. Panics that
//!   escape are caught by the caller (logger or composite) and reported.
//!
//! # Example: custom observer
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use logvisor::{LogEventRef, Observer};
//!
//! #[derive(Default)]
//! struct Counter(AtomicUsize);
//!
//! impl Observer for Counter {
//!     fn log_event(&self, _event: &LogEventRef) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//!     fn name(&self) -> &str { "counter" }
//! }
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::event::LogEventRef;

/// Shared observer handle.
pub type ObserverRef = Arc<dyn Observer>;

/// Receives log events.
pub trait Observer: Send + Sync + 'static {
    /// Accepts one event.
    fn log_event(&self, event: &LogEventRef);

    /// Short name used in diagnostics and status records.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// One-line description for configuration dumps.
    fn describe(&self) -> String {
        self.name().to_string()
    }

    /// Inner observers, when this observer is a fan-out.
    fn members(&self) -> Option<&[ObserverRef]> {
        None
    }
}

/// Function-backed observer.
///
/// ```rust
/// use logvisor::{ObserverFn, ObserverRef, LogEventRef};
///
/// let printer: ObserverRef = ObserverFn::arc("printer", |ev: &LogEventRef| {
///     println!("{}", ev.message());
/// });
/// assert_eq!(printer.name(), "printer");
/// ```
pub struct ObserverFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> fmt::Debug for ObserverFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverFn").field("name", &self.name).finish()
    }
}

impl<F> ObserverFn<F>
where
    F: Fn(&LogEventRef) + Send + Sync + 'static,
{
    /// Creates a function-backed observer.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the observer and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> Observer for ObserverFn<F>
where
    F: Fn(&LogEventRef) + Send + Sync + 'static,
{
    fn log_event(&self, event: &LogEventRef) {
        (self.f)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn log_event(&self, _event: &LogEventRef) {}

    fn name(&self) -> &str {
        "null"
    }
}
