//! Delayed-callback scheduling.
//!
//! The batching engine never sleeps; it asks a [`Scheduler`] to run a
//! callback after a delay and keeps the returned [`ScheduleHandle`] so the
//! callback can be cancelled when the timer is re-armed.
//!
//! ## Contents
//! - [`Scheduler`]        `schedule(delay, callback)`, `cancel(handle)`, `now()`
//! - [`TokioScheduler`]   real time: one tokio task per timer, callback on the blocking pool
//! - [`ManualScheduler`]  virtual clock for deterministic tests, advanced explicitly
//!
//! ## Cancellation
//! Handles wrap a [`CancellationToken`]. Cancelling is idempotent and racing a
//! callback that is already running is harmless: callers that care (the
//! batcher) also check a generation counter inside the callback.

mod manual;
mod realtime;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

pub use manual::ManualScheduler;
pub use realtime::TokioScheduler;

/// Boxed callback run by a scheduler.
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Shared scheduler handle.
pub type SchedulerRef = Arc<dyn Scheduler>;

/// Minimal timer capability used by the batching engine.
pub trait Scheduler: Send + Sync + 'static {
    /// Current time according to this scheduler's clock.
    fn now(&self) -> Instant;

    /// Runs `callback` once `delay` has elapsed, unless cancelled first.
    fn schedule(&self, delay: Duration, callback: Callback) -> ScheduleHandle;

    /// Cancels a pending callback. No-op if it already ran.
    fn cancel(&self, handle: &ScheduleHandle) {
        handle.cancel();
    }
}

/// Cancel handle for one scheduled callback.
#[derive(Clone, Debug, Default)]
pub struct ScheduleHandle {
    token: CancellationToken,
}

impl ScheduleHandle {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Prevents the callback from running if it has not started yet.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True once [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
