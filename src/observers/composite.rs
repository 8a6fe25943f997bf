//! # Synchronous event fan-out to multiple observers.
//!
//! Provides [`CompositeObserver`], which hands each event to a list of
//! observers in order.
//!
//! ## Architecture
//! ```text
//! log_event(event)
//!     │
//!     ├──► observer 1.log_event()
//!     │        └──────► panic → StatusChannel (error), continue
//!     ├──► observer 2.log_event()
//!     └──► observer N.log_event()
//! ```
//!
//! ## Rules
//! - **Ordered**: observers see the event in list order, on the caller's thread.
//! - **Isolation**: a panicking observer is reported once per event and the
//!   remaining observers still receive it.
//! - **Flat**: [`CompositeObserver::combine`] inlines nested composites, so
//!   chains never nest more than one level deep.
//!
//! ## Panic handling
//! `AssertUnwindSafe` is used, which can leave shared state inconsistent if an
//! observer panics while holding a lock of its own.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use super::{NullObserver, Observer, ObserverRef};
use crate::event::LogEventRef;
use crate::status::{panic_message, StatusChannel};

/// Ordered fan-out with per-observer panic isolation.
pub struct CompositeObserver {
    observers: Vec<ObserverRef>,
    status: Arc<StatusChannel>,
}

impl CompositeObserver {
    /// Creates a fan-out over `observers`, reporting to the global status channel.
    pub fn new(observers: Vec<ObserverRef>) -> Self {
        Self {
            observers,
            status: StatusChannel::global(),
        }
    }

    /// Status channel for observer panics.
    #[inline]
    pub fn with_status(mut self, status: Arc<StatusChannel>) -> Self {
        self.status = status;
        self
    }

    /// Combines observers into one.
    ///
    /// - no observers → [`NullObserver`]
    /// - one observer → returned unchanged
    /// - otherwise    → a composite with nested composites flattened
    pub fn combine(observers: impl IntoIterator<Item = ObserverRef>) -> ObserverRef {
        Self::combine_with_status(observers, StatusChannel::global())
    }

    /// [`combine`](Self::combine) reporting to a specific status channel.
    pub fn combine_with_status(
        observers: impl IntoIterator<Item = ObserverRef>,
        status: Arc<StatusChannel>,
    ) -> ObserverRef {
        let mut flat: Vec<ObserverRef> = Vec::new();
        for obs in observers {
            match obs.members() {
                Some(members) => flat.extend(members.iter().cloned()),
                None => flat.push(obs),
            }
        }
        match flat.len() {
            0 => Arc::new(NullObserver),
            1 => flat.remove(0),
            _ => Arc::new(CompositeObserver::new(flat).with_status(status)),
        }
    }

    /// Number of observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// True if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl Observer for CompositeObserver {
    fn log_event(&self, event: &LogEventRef) {
        for obs in &self.observers {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| obs.log_event(event))) {
                self.status.report_error(
                    obs.name(),
                    format!("observer panicked: {}", panic_message(&*panic)),
                    None,
                );
            }
        }
    }

    fn name(&self) -> &str {
        "composite"
    }

    fn describe(&self) -> String {
        let inner: Vec<String> = self.observers.iter().map(|o| o.describe()).collect();
        format!("Composite[{}]", inner.join(", "))
    }

    fn members(&self) -> Option<&[ObserverRef]> {
        Some(&self.observers)
    }
}
