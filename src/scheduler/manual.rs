//! # Virtual-clock scheduler for deterministic tests.
//!
//! [`ManualScheduler`] never runs anything on its own. Time only moves when a
//! test calls [`advance`](ManualScheduler::advance); due callbacks then run on
//! the calling thread in deadline order (ties in scheduling order), with the
//! clock set to each callback's deadline while it runs.
//!
//! ```rust
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//! use std::time::Duration;
//! use logvisor::{ManualScheduler, Scheduler};
//!
//! let sched = ManualScheduler::new();
//! let hits = Arc::new(AtomicUsize::new(0));
//! let h = Arc::clone(&hits);
//! sched.schedule(Duration::from_secs(3), Box::new(move || { h.fetch_add(1, Ordering::SeqCst); }));
//!
//! sched.advance(Duration::from_secs(2));
//! assert_eq!(hits.load(Ordering::SeqCst), 0);
//! sched.advance(Duration::from_secs(1));
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::{Callback, ScheduleHandle, Scheduler};

struct Pending {
    token: CancellationToken,
    callback: Callback,
}

struct ManualState {
    elapsed: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), Pending>,
}

/// Scheduler whose clock is advanced explicitly.
pub struct ManualScheduler {
    origin: Instant,
    state: Mutex<ManualState>,
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ManualScheduler")
            .field("elapsed", &state.elapsed)
            .field("pending", &state.queue.len())
            .finish()
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    /// Creates a scheduler at virtual time zero.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            state: Mutex::new(ManualState {
                elapsed: Duration::ZERO,
                next_id: 0,
                queue: BTreeMap::new(),
            }),
        }
    }

    /// Virtual time since creation.
    pub fn elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }

    /// Number of callbacks queued. Cancelled ones are dropped on the next `schedule`.
    pub fn pending(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Number of callbacks waiting that have not been cancelled.
    pub fn active(&self) -> usize {
        self.state
            .lock()
            .queue
            .values()
            .filter(|p| !p.token.is_cancelled())
            .count()
    }

    /// Moves the clock forward by `by`, running every callback that becomes due.
    ///
    /// Callbacks scheduled by running callbacks are honoured if they fall
    /// inside the same window.
    pub fn advance(&self, by: Duration) {
        let target = self.state.lock().elapsed.saturating_add(by);
        self.run_until(target);
    }

    /// Moves the clock to `at` (virtual time since creation). No-op if `at` is in the past.
    pub fn advance_to(&self, at: Duration) {
        self.run_until(at);
    }

    /// Runs every callback due at the current instant without moving the clock.
    pub fn run_due(&self) {
        let now = self.state.lock().elapsed;
        self.run_until(now);
    }

    fn run_until(&self, target: Duration) {
        loop {
            let next = {
                let mut state = self.state.lock();
                let due = match state.queue.keys().next() {
                    Some(&(deadline, id)) if deadline <= target => (deadline, id),
                    _ => {
                        if target > state.elapsed {
                            state.elapsed = target;
                        }
                        return;
                    }
                };
                state.elapsed = state.elapsed.max(due.0);
                state.queue.remove(&due)
            };

            if let Some(pending) = next {
                if !pending.token.is_cancelled() {
                    (pending.callback)();
                }
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Instant {
        self.origin + self.state.lock().elapsed
    }

    fn schedule(&self, delay: Duration, callback: Callback) -> ScheduleHandle {
        let token = CancellationToken::new();
        let mut state = self.state.lock();

        let cancelled: Vec<_> = state
            .queue
            .iter()
            .filter(|(_, p)| p.token.is_cancelled())
            .map(|(key, _)| *key)
            .collect();
        let dropped: Vec<Pending> = cancelled
            .iter()
            .filter_map(|key| state.queue.remove(key))
            .collect();

        let deadline = state.elapsed.saturating_add(delay);
        let id = state.next_id;
        state.next_id += 1;
        state.queue.insert(
            (deadline, id),
            Pending {
                token: token.clone(),
                callback,
            },
        );
        drop(state);
        // released outside the lock
        drop(dropped);
        ScheduleHandle::new(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Callback) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&log);
        let make = move |name: &'static str| -> Callback {
            let l = Arc::clone(&l);
            Box::new(move || l.lock().push(name))
        };
        (log, make)
    }

    #[test]
    fn test_runs_in_deadline_order() {
        let sched = ManualScheduler::new();
        let (log, cb) = recorder();
        sched.schedule(Duration::from_secs(5), cb("late"));
        sched.schedule(Duration::from_secs(1), cb("early"));
        sched.schedule(Duration::from_secs(1), cb("early-second"));

        sched.advance(Duration::from_secs(10));
        assert_eq!(*log.lock(), vec!["early", "early-second", "late"]);
        assert_eq!(sched.elapsed(), Duration::from_secs(10));
    }

    #[test]
    fn test_cancelled_is_skipped() {
        let sched = ManualScheduler::new();
        let (log, cb) = recorder();
        let h = sched.schedule(Duration::from_secs(1), cb("cancelled"));
        sched.schedule(Duration::from_secs(2), cb("kept"));
        sched.cancel(&h);
        assert_eq!(sched.active(), 1);

        sched.advance(Duration::from_secs(3));
        assert_eq!(*log.lock(), vec!["kept"]);
    }

    #[test]
    fn test_cancelled_entries_do_not_pile_up() {
        let sched = ManualScheduler::new();
        let (log, cb) = recorder();
        let mut handle = sched.schedule(Duration::from_secs(3_600), cb("stale"));
        for _ in 0..1_000 {
            handle.cancel();
            handle = sched.schedule(Duration::from_secs(3_600), cb("rearmed"));
        }
        assert_eq!(sched.pending(), 1);
        assert_eq!(sched.active(), 1);

        sched.advance(Duration::from_secs(3_600));
        assert_eq!(*log.lock(), vec!["rearmed"]);
    }

    #[test]
    fn test_huge_delay_saturates() {
        let sched = ManualScheduler::new();
        let (log, cb) = recorder();
        sched.advance(Duration::from_secs(1));
        sched.schedule(Duration::MAX, cb("never"));
        sched.advance(Duration::from_secs(86_400));
        assert!(log.lock().is_empty());
        assert_eq!(sched.active(), 1);
    }

    #[test]
    fn test_clock_reads_deadline_inside_callback() {
        let sched = Arc::new(ManualScheduler::new());
        let seen = Arc::new(Mutex::new(None));
        let (s, out) = (Arc::clone(&sched), Arc::clone(&seen));
        sched.schedule(
            Duration::from_secs(2),
            Box::new(move || *out.lock() = Some(s.elapsed())),
        );
        sched.advance(Duration::from_secs(7));
        assert_eq!(*seen.lock(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_callbacks_can_reschedule() {
        let sched = Arc::new(ManualScheduler::new());
        let (log, cb) = recorder();
        let s = Arc::clone(&sched);
        let follow_up = cb("follow-up");
        sched.schedule(
            Duration::from_secs(1),
            Box::new(move || {
                s.schedule(Duration::from_secs(1), follow_up);
            }),
        );
        sched.advance(Duration::from_secs(3));
        assert_eq!(*log.lock(), vec!["follow-up"]);
    }
}
