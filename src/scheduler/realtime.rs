//! # Tokio-backed scheduler.
//!
//! Each scheduled callback gets its own lightweight tokio task that sleeps for
//! the delay and then runs the callback on the blocking pool, so a slow sink
//! never occupies an async worker and never runs on a producer thread.
//!
//! ```text
//! schedule(delay, cb)
//!     └─► spawn ─► select! { cancelled ─► drop cb
//!                            sleep(delay) ─► spawn_blocking(cb) }
//! ```
//!
//! The clock is [`tokio::time::Instant`], so `#[tokio::test(start_paused = true)]`
//! drives it virtually.

use std::fmt;
use std::time::{Duration, Instant};

use tokio::runtime::{Builder, Handle, Runtime};
use tokio_util::sync::CancellationToken;

use super::{Callback, ScheduleHandle, Scheduler};

/// Real-time scheduler running on a tokio runtime.
pub struct TokioScheduler {
    handle: Handle,
    /// Present only when this scheduler had to start its own runtime.
    owned: Option<Runtime>,
}

impl fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioScheduler")
            .field("owns_runtime", &self.owned.is_some())
            .finish()
    }
}

impl TokioScheduler {
    /// Uses the given runtime handle.
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            owned: None,
        }
    }

    /// Uses the runtime of the calling context, if any.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }

    /// Uses the calling context's runtime, or starts a single-worker runtime
    /// (`logvisor-scheduler` thread) when called outside of one.
    pub fn current_or_dedicated() -> std::io::Result<Self> {
        if let Some(sched) = Self::current() {
            return Ok(sched);
        }
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(4)
            .thread_name("logvisor-scheduler")
            .enable_time()
            .build()?;
        Ok(Self {
            handle: runtime.handle().clone(),
            owned: Some(runtime),
        })
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn schedule(&self, delay: Duration, callback: Callback) -> ScheduleHandle {
        let token = CancellationToken::new();
        let child = token.clone();

        self.handle.spawn(async move {
            tokio::select! {
                biased;
                _ = child.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if !child.is_cancelled() {
                        // Panics are contained by the callback's owner; the join error is irrelevant here.
                        let _ = tokio::task::spawn_blocking(callback).await;
                    }
                }
            }
        });
        ScheduleHandle::new(token)
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        if let Some(rt) = self.owned.take() {
            rt.shutdown_background();
        }
    }
}
