//! # Batching state machine.
//!
//! A [`Batcher`] accumulates events into a [`Batch`] and decides when to hand
//! it to its [`BatchProcessor`](super::BatchProcessor). Timing comes from a
//! [`BatchPolicy`] and a [`Cooldown`] (fixed, or escalating per marker).
//!
//! ## Architecture
//! ```text
//!            accept(event)                    flush timer / max-wait fires
//!   Idle ──────────────────► Open ──────────────────────────────► Flushing
//!    ▲                       │  ▲ accept: append, re-arm flush      │
//!    │                       │  └───────────────────────────────────┤ events arrived
//!    │ cooldown elapses      │ accept                               │ during delivery
//!    │                       ▼                                      │
//!   Cooldown ◄──────────────────────────────────────────────────────┘ nothing pending
//! ```
//!
//! ## Rules
//! - Flush deadline on every accept: the end of the cooldown while one is in
//!   force, `now + idle_threshold` otherwise. The previous flush timer is
//!   cancelled; the max-wait timer is armed once per batch.
//! - The batch swap happens in one critical section; the processor is called
//!   with no lock held.
//! - A trigger that fires while a delivery is running, `flush_now` included, is
//!   remembered and honoured when it completes. Deliveries never overlap.
//! - Timer callbacks carry the batch generation they were armed for; stale ones
//!   are ignored.
//! - Delivery errors and panics go to the status channel. The batch is dropped.
//! - An empty batch is never delivered.

use std::fmt;
use std::mem;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::processor::ProcessorRef;
use super::Batch;
use crate::event::{LogEventRef, Marker};
use crate::policies::{BatchPolicy, RepeatKey, ThrottleSchedule};
use crate::scheduler::{ScheduleHandle, SchedulerRef};
use crate::status::{panic_message, StatusChannel};

/// Lifecycle phase of a [`Batcher`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BatcherPhase {
    /// Nothing pending, no recent flush.
    Idle,
    /// Events accumulating, flush timer armed.
    Open,
    /// A batch is with the processor.
    Flushing,
    /// Recently flushed, nothing pending.
    Cooldown,
}

impl BatcherPhase {
    /// Lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BatcherPhase::Idle => "idle",
            BatcherPhase::Open => "open",
            BatcherPhase::Flushing => "flushing",
            BatcherPhase::Cooldown => "cooldown",
        }
    }
}

impl fmt::Display for BatcherPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// How long to hold back after a flush.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cooldown {
    /// Same cooldown after every flush.
    Fixed(Duration),
    /// Escalates on consecutive flushes and resets after a quiet period.
    Escalating(ThrottleSchedule),
}

impl Cooldown {
    /// Step and cooldown that apply after a flush, given the previous step.
    fn after_flush(&self, step: Option<usize>) -> (Option<usize>, Duration) {
        match self {
            Cooldown::Fixed(d) => (None, *d),
            Cooldown::Escalating(schedule) => {
                let next = step.map_or(0, |i| schedule.next_step(i));
                (Some(next), schedule.cooldown(next))
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Timer {
    Flush,
    MaxWait,
    CooldownEnd,
}

struct BatcherState {
    phase: BatcherPhase,
    batch: Batch,
    generation: u64,
    last_event_at: Option<Instant>,
    last_flush_at: Option<Instant>,
    current_cooldown: Duration,
    step: Option<usize>,
    flush_timer: Option<ScheduleHandle>,
    max_wait_timer: Option<ScheduleHandle>,
    cooldown_timer: Option<ScheduleHandle>,
    flush_requested: bool,
    flushed_batches: u64,
    flushed_events: u64,
}

impl BatcherState {
    fn cancel_batch_timers(&mut self) {
        if let Some(t) = self.flush_timer.take() {
            t.cancel();
        }
        if let Some(t) = self.max_wait_timer.take() {
            t.cancel();
        }
    }

    fn cancel_all_timers(&mut self) {
        self.cancel_batch_timers();
        if let Some(t) = self.cooldown_timer.take() {
            t.cancel();
        }
    }
}

/// Accumulates events and flushes them as batches on a schedule.
///
/// Always handled through `Arc<Batcher>`; timers hold only a weak reference,
/// so dropping the last `Arc` silences every pending callback.
pub struct Batcher {
    name: Arc<str>,
    policy: BatchPolicy,
    cooldown: Cooldown,
    processor: ProcessorRef,
    scheduler: SchedulerRef,
    status: Arc<StatusChannel>,
    state: Mutex<BatcherState>,
    me: Weak<Batcher>,
}

impl fmt::Debug for Batcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Batcher")
            .field("name", &self.name)
            .field("phase", &state.phase)
            .field("pending", &state.batch.len())
            .field("policy", &self.policy)
            .field("cooldown", &self.cooldown)
            .finish()
    }
}

impl Batcher {
    /// Starts building a batcher that delivers to `processor` on `scheduler`.
    pub fn builder(processor: ProcessorRef, scheduler: SchedulerRef) -> BatcherBuilder {
        BatcherBuilder {
            name: None,
            policy: BatchPolicy::default(),
            cooldown: None,
            marker: None,
            show_repeats_individually: false,
            repeat_key: RepeatKey::default(),
            processor,
            scheduler,
            status: None,
        }
    }

    /// Name used as the status-channel component.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Timing policy.
    pub fn policy(&self) -> &BatchPolicy {
        &self.policy
    }

    /// Cooldown rule.
    pub fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    /// Current phase.
    pub fn phase(&self) -> BatcherPhase {
        self.state.lock().phase
    }

    /// Events waiting in the open batch.
    pub fn pending(&self) -> usize {
        self.state.lock().batch.len()
    }

    /// Cooldown that follows the most recent flush (zero before the first).
    pub fn current_cooldown(&self) -> Duration {
        self.state.lock().current_cooldown
    }

    /// Batches handed to the processor so far.
    pub fn flushed_batches(&self) -> u64 {
        self.state.lock().flushed_batches
    }

    /// Events handed to the processor so far.
    pub fn flushed_events(&self) -> u64 {
        self.state.lock().flushed_events
    }

    /// Appends an event and (re-)arms the flush timer.
    ///
    /// Never blocks beyond the batcher's own short critical section.
    pub fn accept(&self, event: LogEventRef) {
        let mut st = self.state.lock();
        let now = self.scheduler.now();

        if let (Cooldown::Escalating(_), Some(_), Some(last)) =
            (&self.cooldown, st.step, st.last_event_at)
        {
            if now.saturating_duration_since(last) >= st.current_cooldown {
                st.step = None;
            }
        }
        st.last_event_at = Some(now);

        let first = st.batch.is_empty();
        st.batch.push(event);
        if first {
            let generation = st.generation;
            st.max_wait_timer =
                Some(self.arm(self.policy.maximum_wait_time, generation, Timer::MaxWait));
        }

        if st.phase == BatcherPhase::Flushing {
            return;
        }
        if let Some(t) = st.cooldown_timer.take() {
            t.cancel();
        }
        st.phase = BatcherPhase::Open;
        self.arm_flush(&mut st, now);
    }

    /// Flushes the open batch immediately, bypassing idle and cooldown.
    ///
    /// Runs the processor on the calling thread. Used on shutdown. While a
    /// delivery is running, the open batch is handed to it instead and goes
    /// out as soon as that delivery completes, so batches never overlap.
    pub fn flush_now(&self) {
        let batch = {
            let mut st = self.state.lock();
            if st.phase == BatcherPhase::Flushing {
                if !st.batch.is_empty() {
                    st.flush_requested = true;
                }
                return;
            }
            self.take_batch(&mut st)
        };
        if let Some(batch) = batch {
            self.deliver(batch);
        }
    }

    /// Inside a cooldown the batch goes out when it ends; otherwise after the idle threshold.
    fn arm_flush(&self, st: &mut BatcherState, now: Instant) {
        let remaining = st.last_flush_at.map_or(Duration::ZERO, |last_flush| {
            st.current_cooldown
                .saturating_sub(now.saturating_duration_since(last_flush))
        });
        let delay = if remaining.is_zero() {
            self.policy.idle_threshold
        } else {
            remaining
        };
        if let Some(t) = st.flush_timer.take() {
            t.cancel();
        }
        st.flush_timer = Some(self.arm(delay, st.generation, Timer::Flush));
    }

    fn arm(&self, delay: Duration, generation: u64, timer: Timer) -> ScheduleHandle {
        let me = self.me.clone();
        self.scheduler.schedule(
            delay,
            Box::new(move || {
                if let Some(batcher) = me.upgrade() {
                    batcher.on_timer(generation, timer);
                }
            }),
        )
    }

    fn on_timer(&self, generation: u64, timer: Timer) {
        let batch = {
            let mut st = self.state.lock();
            if st.generation != generation {
                return;
            }
            match timer {
                Timer::CooldownEnd => {
                    if st.phase == BatcherPhase::Cooldown {
                        st.cooldown_timer = None;
                        st.phase = BatcherPhase::Idle;
                    }
                    return;
                }
                Timer::Flush | Timer::MaxWait => {
                    if st.phase == BatcherPhase::Flushing {
                        st.flush_requested = true;
                        return;
                    }
                    self.take_batch(&mut st)
                }
            }
        };
        if let Some(batch) = batch {
            self.deliver(batch);
        }
    }

    /// Swaps the open batch out. `None` (and no state change) when it is empty.
    fn take_batch(&self, st: &mut BatcherState) -> Option<Batch> {
        st.cancel_batch_timers();
        if st.batch.is_empty() {
            return None;
        }
        let fresh = st.batch.fresh();
        let batch = mem::replace(&mut st.batch, fresh);
        st.generation += 1;
        st.phase = BatcherPhase::Flushing;
        st.flush_requested = false;
        let (step, cooldown) = self.cooldown.after_flush(st.step);
        st.step = step;
        st.current_cooldown = cooldown;
        Some(batch)
    }

    fn deliver(&self, mut batch: Batch) {
        loop {
            let count = batch.len();
            let outcome = catch_unwind(AssertUnwindSafe(|| self.processor.process_batch(batch)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(err)) => self.status.report_error(
                    &self.name,
                    format!("failed to deliver batch of {count} events"),
                    Some(&err),
                ),
                Err(panic) => self.status.report_error(
                    &self.name,
                    format!(
                        "processor panicked on batch of {count} events: {}",
                        panic_message(&*panic)
                    ),
                    None,
                ),
            }

            let next = {
                let mut st = self.state.lock();
                let now = self.scheduler.now();
                st.last_flush_at = Some(now);
                st.flushed_batches += 1;
                st.flushed_events += count as u64;

                if st.batch.is_empty() {
                    if st.phase == BatcherPhase::Flushing {
                        st.phase = BatcherPhase::Cooldown;
                        let (cooldown, generation) = (st.current_cooldown, st.generation);
                        if let Some(t) = st.cooldown_timer.take() {
                            t.cancel();
                        }
                        st.cooldown_timer = Some(self.arm(cooldown, generation, Timer::CooldownEnd));
                    }
                    None
                } else if st.flush_requested {
                    self.take_batch(&mut st)
                } else {
                    st.phase = BatcherPhase::Open;
                    self.arm_flush(&mut st, now);
                    None
                }
            };
            match next {
                Some(b) => batch = b,
                None => break,
            }
        }
    }
}

impl Drop for Batcher {
    fn drop(&mut self) {
        self.state.get_mut().cancel_all_timers();
    }
}

/// Builder for [`Batcher`].
pub struct BatcherBuilder {
    name: Option<String>,
    policy: BatchPolicy,
    cooldown: Option<Cooldown>,
    marker: Option<Marker>,
    show_repeats_individually: bool,
    repeat_key: RepeatKey,
    processor: ProcessorRef,
    scheduler: SchedulerRef,
    status: Option<Arc<StatusChannel>>,
}

impl BatcherBuilder {
    /// Status-channel component name (defaults to the processor's name).
    #[inline]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Timing policy.
    #[inline]
    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Cooldown rule (defaults to `Fixed(policy.cooldown_time)`).
    #[inline]
    pub fn with_cooldown(mut self, cooldown: Cooldown) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    /// Marker recorded on every batch this batcher produces.
    #[inline]
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Ask formatters to list repeated events one by one.
    #[inline]
    pub fn with_show_repeats_individually(mut self, show: bool) -> Self {
        self.show_repeats_individually = show;
        self
    }

    /// Repeat key recorded on every batch.
    #[inline]
    pub fn with_repeat_key(mut self, key: RepeatKey) -> Self {
        self.repeat_key = key;
        self
    }

    /// Status channel for delivery failures (defaults to the global one).
    #[inline]
    pub fn with_status(mut self, status: Arc<StatusChannel>) -> Self {
        self.status = Some(status);
        self
    }

    /// Builds the batcher.
    pub fn build(self) -> Arc<Batcher> {
        let name: Arc<str> = match self.name {
            Some(n) => Arc::from(n),
            None => Arc::from(self.processor.name()),
        };
        let cooldown = self
            .cooldown
            .unwrap_or(Cooldown::Fixed(self.policy.cooldown_time));
        let batch = Batch::new()
            .with_marker(self.marker)
            .with_show_repeats_individually(self.show_repeats_individually)
            .with_repeat_key(self.repeat_key);
        let status = self.status.unwrap_or_else(StatusChannel::global);

        Arc::new_cyclic(|me| Batcher {
            name,
            policy: self.policy,
            cooldown,
            processor: self.processor,
            scheduler: self.scheduler,
            status,
            state: Mutex::new(BatcherState {
                phase: BatcherPhase::Idle,
                batch,
                generation: 0,
                last_event_at: None,
                last_flush_at: None,
                current_cooldown: Duration::ZERO,
                step: None,
                flush_timer: None,
                max_wait_timer: None,
                cooldown_timer: None,
                flush_requested: false,
                flushed_batches: 0,
                flushed_events: 0,
            }),
            me: me.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::ProcessorFn;
    use crate::error::DeliveryError;
    use crate::event::{Level, LogEvent};
    use crate::scheduler::ManualScheduler;
    use crate::status::StatusLevel;

    type Log = Arc<Mutex<Vec<(Duration, Vec<String>)>>>;

    fn secs(s: f64) -> Duration {
        Duration::from_millis((s * 1000.0).round() as u64)
    }

    fn ev(msg: &str) -> LogEventRef {
        LogEvent::new("test", Level::Warn, msg).into_ref()
    }

    fn setup(policy: BatchPolicy) -> (Arc<ManualScheduler>, Arc<Batcher>, Log) {
        let sched = Arc::new(ManualScheduler::new());
        let log: Log = Arc::default();
        let (clock, sink) = (Arc::clone(&sched), Arc::clone(&log));
        let processor = ProcessorFn::arc("recorder", move |batch: Batch| {
            let msgs = batch.iter().map(|e| e.message()).collect();
            sink.lock().push((clock.elapsed(), msgs));
            Ok::<(), DeliveryError>(())
        });
        let batcher = Batcher::builder(processor, sched.clone())
            .with_policy(policy)
            .with_status(Arc::new(StatusChannel::new(16)))
            .build();
        (sched, batcher, log)
    }

    fn policy(idle: f64, cooldown: f64, max_wait: f64) -> BatchPolicy {
        BatchPolicy::default()
            .with_idle_threshold(secs(idle))
            .with_cooldown_time(secs(cooldown))
            .with_maximum_wait_time(secs(max_wait))
    }

    #[test]
    fn test_single_event_flushes_after_idle_threshold() {
        let (sched, batcher, log) = setup(policy(3.0, 5.0, 180.0));
        batcher.accept(ev("one"));
        assert_eq!(batcher.phase(), BatcherPhase::Open);

        sched.advance(secs(2.9));
        assert!(log.lock().is_empty());
        sched.advance(secs(0.1));
        assert_eq!(*log.lock(), vec![(secs(3.0), vec!["one".to_string()])]);
        assert_eq!(batcher.phase(), BatcherPhase::Cooldown);

        sched.advance(secs(5.0));
        assert_eq!(batcher.phase(), BatcherPhase::Idle);
    }

    #[test]
    fn test_burst_then_event_inside_cooldown() {
        let (sched, batcher, log) = setup(policy(3.0, 5.0, 180.0));
        batcher.accept(ev("a"));
        sched.advance_to(secs(0.1));
        batcher.accept(ev("b"));
        sched.advance_to(secs(0.2));
        batcher.accept(ev("c"));

        sched.advance_to(secs(4.0));
        assert_eq!(log.lock().len(), 1);
        assert_eq!(log.lock()[0].0, secs(3.2));
        assert_eq!(log.lock()[0].1.len(), 3);

        batcher.accept(ev("d"));
        sched.advance_to(secs(8.1));
        assert_eq!(log.lock().len(), 1, "must wait for cooldown end");
        sched.advance_to(secs(8.2));
        assert_eq!(log.lock().len(), 2);
        assert_eq!(log.lock()[1], (secs(8.2), vec!["d".to_string()]));
    }

    #[test]
    fn test_event_near_cooldown_end_goes_out_when_it_ends() {
        let (sched, batcher, log) = setup(policy(3.0, 5.0, 180.0));
        batcher.accept(ev("first"));
        sched.advance_to(secs(3.0));
        assert_eq!(log.lock().len(), 1);

        // cooldown runs until 8.0; the idle threshold would land at 10.5
        sched.advance_to(secs(7.5));
        batcher.accept(ev("late"));
        sched.advance_to(secs(7.9));
        assert_eq!(log.lock().len(), 1);
        sched.advance_to(secs(8.0));
        assert_eq!(log.lock()[1], (secs(8.0), vec!["late".to_string()]));

        // outside the cooldown the idle threshold applies again
        sched.advance_to(secs(20.0));
        batcher.accept(ev("quiet"));
        sched.advance_to(secs(22.9));
        assert_eq!(log.lock().len(), 2);
        sched.advance_to(secs(23.0));
        assert_eq!(log.lock()[2], (secs(23.0), vec!["quiet".to_string()]));
    }

    #[test]
    fn test_huge_cooldown_never_overflows() {
        let (sched, batcher, log) = setup(
            BatchPolicy::default()
                .with_idle_threshold(secs(3.0))
                .with_cooldown_time(Duration::MAX)
                .with_maximum_wait_time(Duration::MAX),
        );
        batcher.accept(ev("one"));
        sched.advance(secs(3.0));
        assert_eq!(log.lock().len(), 1);

        batcher.accept(ev("two"));
        sched.advance(secs(86_400.0));
        assert_eq!(log.lock().len(), 1);
        assert_eq!(batcher.pending(), 1);

        batcher.flush_now();
        assert_eq!(log.lock().len(), 2);
    }

    #[test]
    fn test_flush_now_during_delivery_waits_for_it() {
        let sched = Arc::new(ManualScheduler::new());
        let trace: Arc<Mutex<Vec<String>>> = Arc::default();
        let me: Arc<Mutex<Option<Weak<Batcher>>>> = Arc::default();
        let (out, slot) = (Arc::clone(&trace), Arc::clone(&me));
        let processor = ProcessorFn::arc("nested", move |batch: Batch| {
            let msgs: Vec<String> = batch.iter().map(|e| e.message()).collect();
            out.lock().push(format!("start {}", msgs.join(",")));
            if msgs == ["a"] {
                let batcher = slot.lock().as_ref().and_then(Weak::upgrade);
                if let Some(batcher) = batcher {
                    batcher.accept(ev("b"));
                    batcher.flush_now();
                }
            }
            out.lock().push(format!("end {}", msgs.join(",")));
            Ok::<(), DeliveryError>(())
        });
        let batcher = Batcher::builder(processor, sched.clone())
            .with_policy(policy(3.0, 5.0, 180.0))
            .build();
        *me.lock() = Some(Arc::downgrade(&batcher));

        batcher.accept(ev("a"));
        sched.advance(secs(3.0));

        assert_eq!(
            *trace.lock(),
            vec!["start a", "end a", "start b", "end b"]
        );
        assert_eq!(batcher.flushed_batches(), 2);
        assert_eq!(batcher.phase(), BatcherPhase::Cooldown);
    }

    #[test]
    fn test_max_wait_caps_a_never_idle_stream() {
        let (sched, batcher, log) = setup(policy(3.0, 5.0, 180.0));
        for _ in 0..200 {
            batcher.accept(ev("tick"));
            sched.advance(secs(1.0));
        }
        let first = log.lock()[0].clone();
        assert_eq!(first.0, secs(180.0));
        assert_eq!(first.1.len(), 180);
    }

    #[test]
    fn test_escalating_cooldown() {
        let sched = Arc::new(ManualScheduler::new());
        let schedule = ThrottleSchedule::new(
            "AUDIT",
            vec![secs(60.0), secs(600.0), secs(1800.0)],
        )
        .expect("schedule");
        let processor = ProcessorFn::arc("noop", |_batch: Batch| Ok::<(), DeliveryError>(()));
        let batcher = Batcher::builder(processor, sched.clone())
            .with_policy(policy(3.0, 5.0, 180.0))
            .with_cooldown(Cooldown::Escalating(schedule))
            .build();

        batcher.accept(ev("1"));
        sched.advance_to(secs(3.0));
        assert_eq!(batcher.current_cooldown(), secs(60.0));

        batcher.accept(ev("2"));
        sched.advance_to(secs(70.0));
        assert_eq!(batcher.flushed_batches(), 2);
        assert_eq!(batcher.current_cooldown(), secs(600.0));

        // quiet for longer than the current cooldown
        sched.advance_to(secs(700.0));
        batcher.accept(ev("3"));
        sched.advance_to(secs(703.0));
        assert_eq!(batcher.flushed_batches(), 3);
        assert_eq!(batcher.current_cooldown(), secs(60.0));
    }

    #[test]
    fn test_empty_flush_never_reaches_processor() {
        let (sched, batcher, log) = setup(policy(3.0, 5.0, 180.0));
        batcher.flush_now();
        sched.advance(secs(600.0));
        assert!(log.lock().is_empty());
        assert_eq!(batcher.phase(), BatcherPhase::Idle);
    }

    #[test]
    fn test_flush_now_bypasses_idle_and_cooldown() {
        let (sched, batcher, log) = setup(policy(3.0, 5.0, 180.0));
        batcher.accept(ev("x"));
        batcher.flush_now();
        assert_eq!(log.lock().len(), 1);

        // the cancelled idle timer must not deliver anything
        sched.advance(secs(10.0));
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_delivery_failure_is_reported_not_retried() {
        let sched = Arc::new(ManualScheduler::new());
        let status = Arc::new(StatusChannel::new(16));
        let processor = ProcessorFn::arc("flaky", |_batch: Batch| {
            Err(DeliveryError::Unavailable {
                reason: "connection refused".into(),
            })
        });
        let batcher = Batcher::builder(processor, sched.clone())
            .with_policy(policy(1.0, 1.0, 10.0))
            .with_status(Arc::clone(&status))
            .build();

        batcher.accept(ev("lost"));
        sched.advance(secs(30.0));

        let errors = status.at_least(StatusLevel::Error);
        assert_eq!(errors.len(), 1);
        assert_eq!(&*errors[0].component, "flaky");
        assert_eq!(batcher.flushed_batches(), 1);
        assert_eq!(batcher.phase(), BatcherPhase::Idle);
    }

    #[test]
    fn test_processor_panic_is_contained() {
        let sched = Arc::new(ManualScheduler::new());
        let status = Arc::new(StatusChannel::new(16));
        let processor = ProcessorFn::arc("boom", |_batch: Batch| -> Result<(), DeliveryError> {
            panic!("sink exploded")
        });
        let batcher = Batcher::builder(processor, sched.clone())
            .with_policy(policy(1.0, 1.0, 10.0))
            .with_status(Arc::clone(&status))
            .build();

        batcher.accept(ev("x"));
        sched.advance(secs(1.0));
        let errors = status.at_least(StatusLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("sink exploded"));

        batcher.accept(ev("y"));
        sched.advance(secs(5.0));
        assert_eq!(batcher.flushed_batches(), 2);
    }

    #[test]
    fn test_dropping_batcher_silences_timers() {
        let (sched, batcher, log) = setup(policy(3.0, 5.0, 180.0));
        batcher.accept(ev("x"));
        drop(batcher);
        sched.advance(secs(200.0));
        assert!(log.lock().is_empty());
        assert_eq!(sched.active(), 0);
    }
}
