//! # Status channel: self-diagnostics for the logging pipeline.
//!
//! [`StatusChannel`] records what went wrong *inside* logvisor: observers that
//! panicked, processors that failed to deliver, configuration that was rejected.
//! Records are never sent to the observers they describe, so a broken sink
//! cannot feed back into itself.
//!
//! ## Architecture
//! ```text
//! Logger / CompositeObserver / Batcher
//!        │ report_error(component, message, cause)
//!        ▼
//! StatusChannel ──► bounded ring (VecDeque, oldest dropped first)
//!        ├──────► broadcast::Sender (live watchers, lagging receivers skip)
//!        └──────► tracing (target "logvisor::status")
//! ```
//!
//! ## Rules
//! - **Append-only**: records are never modified after being added.
//! - **Bounded**: at most `capacity` records are retained.
//! - **Independent lock**: the ring's lock is never held while calling into
//!   batchers or observers.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::broadcast;

/// Default number of retained records.
pub const DEFAULT_STATUS_CAPACITY: usize = 1000;

static STATUS_SEQ: AtomicU64 = AtomicU64::new(0);
static GLOBAL: OnceLock<Arc<StatusChannel>> = OnceLock::new();

/// Severity of a status record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub enum StatusLevel {
    /// Verbose lifecycle information.
    Debug,
    /// Notable lifecycle information (startup, shutdown flushes).
    Info,
    /// A recoverable failure (event or batch dropped).
    Error,
    /// A component could not be set up and is not working.
    Fatal,
}

/// One self-diagnostic record.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct StatusRecord {
    /// Process-wide sequence number.
    pub seq: u64,
    /// Severity.
    pub level: StatusLevel,
    /// Component that reported (logger name, observer name, processor name).
    pub component: Arc<str>,
    /// What happened.
    pub message: String,
    /// Rendered cause, if any.
    pub cause: Option<String>,
    /// When it was reported.
    pub at: DateTime<Utc>,
}

impl fmt::Display for StatusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}: {}", self.level, self.component, self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, " ({cause})")?;
        }
        Ok(())
    }
}

/// Bounded, append-only diagnostics log with a live feed.
pub struct StatusChannel {
    records: Mutex<VecDeque<StatusRecord>>,
    capacity: usize,
    tx: broadcast::Sender<StatusRecord>,
}

impl fmt::Debug for StatusChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusChannel")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

impl Default for StatusChannel {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_CAPACITY)
    }
}

impl StatusChannel {
    /// Creates a channel retaining at most `capacity` records (min 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel(capacity.min(1024));
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
            tx,
        }
    }

    /// Process-wide channel, created on first use.
    pub fn global() -> Arc<StatusChannel> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(StatusChannel::default())))
    }

    /// Appends a record.
    pub fn report(
        &self,
        level: StatusLevel,
        component: &str,
        message: impl Into<String>,
        cause: Option<&dyn std::error::Error>,
    ) {
        let record = StatusRecord {
            seq: STATUS_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            level,
            component: Arc::from(component),
            message: message.into(),
            cause: cause.map(|c| c.to_string()),
            at: Utc::now(),
        };
        self.mirror(&record);

        {
            let mut records = self.records.lock();
            if records.len() == self.capacity {
                records.pop_front();
            }
            records.push_back(record.clone());
        }
        let _ = self.tx.send(record);
    }

    /// Appends an [`StatusLevel::Error`] record.
    pub fn report_error(
        &self,
        component: &str,
        message: impl Into<String>,
        cause: Option<&dyn std::error::Error>,
    ) {
        self.report(StatusLevel::Error, component, message, cause);
    }

    /// Appends a [`StatusLevel::Fatal`] record.
    pub fn report_fatal(
        &self,
        component: &str,
        message: impl Into<String>,
        cause: Option<&dyn std::error::Error>,
    ) {
        self.report(StatusLevel::Fatal, component, message, cause);
    }

    /// Appends a [`StatusLevel::Info`] record.
    pub fn report_info(&self, component: &str, message: impl Into<String>) {
        self.report(StatusLevel::Info, component, message, None);
    }

    /// Appends a [`StatusLevel::Debug`] record.
    pub fn report_debug(&self, component: &str, message: impl Into<String>) {
        self.report(StatusLevel::Debug, component, message, None);
    }

    /// Copy of all retained records, oldest first.
    pub fn snapshot(&self) -> Vec<StatusRecord> {
        self.records.lock().iter().cloned().collect()
    }

    /// Retained records at or above `level`.
    pub fn at_least(&self, level: StatusLevel) -> Vec<StatusRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.level >= level)
            .cloned()
            .collect()
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// True if nothing has been retained.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Drops all retained records.
    pub fn clear(&self) {
        self.records.lock().clear();
    }

    /// Subscribes to records reported after this call.
    ///
    /// Slow receivers observe `RecvError::Lagged(n)` and skip older records.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusRecord> {
        self.tx.subscribe()
    }

    fn mirror(&self, record: &StatusRecord) {
        let component = &*record.component;
        let cause = record.cause.as_deref().unwrap_or("");
        match record.level {
            StatusLevel::Debug => {
                tracing::debug!(target: "logvisor::status", component, "{}", record.message)
            }
            StatusLevel::Info => {
                tracing::info!(target: "logvisor::status", component, "{}", record.message)
            }
            StatusLevel::Error => {
                tracing::error!(target: "logvisor::status", component, cause, "{}", record.message)
            }
            StatusLevel::Fatal => {
                tracing::error!(target: "logvisor::status", component, cause, fatal = true, "{}", record.message)
            }
        }
    }
}

/// Extracts a printable message from a `catch_unwind` payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeliveryError;

    #[test]
    fn test_retention_is_bounded() {
        let status = StatusChannel::new(3);
        for i in 0..5 {
            status.report_info("test", format!("record {i}"));
        }
        let messages: Vec<_> = status.snapshot().into_iter().map(|r| r.message).collect();
        assert_eq!(messages, vec!["record 2", "record 3", "record 4"]);
    }

    #[test]
    fn test_cause_is_rendered() {
        let status = StatusChannel::new(10);
        let err = DeliveryError::Unavailable {
            reason: "connection refused".into(),
        };
        status.report_error("slack", "failed to deliver", Some(&err));
        let rec = &status.snapshot()[0];
        assert_eq!(rec.level, StatusLevel::Error);
        assert_eq!(&*rec.component, "slack");
        assert_eq!(
            rec.cause.as_deref(),
            Some("sink unavailable: connection refused")
        );
    }

    #[test]
    fn test_at_least_filters() {
        let status = StatusChannel::new(10);
        status.report_debug("a", "noise");
        status.report_error("a", "broken", None);
        status.report_fatal("a", "dead", None);
        assert_eq!(status.at_least(StatusLevel::Error).len(), 2);
    }

    #[test]
    fn test_subscribers_see_new_records() {
        let status = StatusChannel::new(10);
        let mut rx = status.subscribe();
        status.report_error("a", "broken", None);
        let rec = rx.try_recv().expect("record broadcast");
        assert_eq!(rec.message, "broken");
    }
}
