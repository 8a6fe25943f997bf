//! # Per-marker throttling.
//!
//! [`MarkerThrottle`] routes each event to a [`Batcher`]: events carrying a
//! marker with a configured [`ThrottleSchedule`] go to that marker's own
//! batcher (escalating cooldown), everything else goes to the default batcher
//! (fixed cooldown from the [`BatchPolicy`]).
//!
//! ```text
//! event ─► marker? ──yes, scheduled──► Batcher[AUDIT]  Cooldown::Escalating([1m, 10m, 30m])
//!             │
//!             └──────otherwise───────► Batcher[default] Cooldown::Fixed(cooldown_time)
//! ```
//!
//! All batchers share one processor, so a sink sees marker batches and
//! regular batches through the same interface; [`Batch::marker`](super::Batch::marker)
//! tells them apart.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::batcher::{Batcher, BatcherBuilder, Cooldown};
use super::processor::ProcessorRef;
use crate::event::{LogEventRef, Marker};
use crate::policies::{BatchPolicy, RepeatKey, ThrottleSchedule};
use crate::scheduler::SchedulerRef;
use crate::status::StatusChannel;

/// Routes events to the default batcher or a per-marker throttled one.
pub struct MarkerThrottle {
    default: Arc<Batcher>,
    by_marker: HashMap<Marker, Arc<Batcher>>,
}

impl fmt::Debug for MarkerThrottle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut markers: Vec<_> = self.by_marker.keys().map(Marker::name).collect();
        markers.sort_unstable();
        f.debug_struct("MarkerThrottle")
            .field("default", &self.default.name())
            .field("markers", &markers)
            .finish()
    }
}

impl MarkerThrottle {
    /// Starts building a throttle that delivers to `processor`.
    pub fn builder(processor: ProcessorRef, scheduler: SchedulerRef) -> MarkerThrottleBuilder {
        MarkerThrottleBuilder {
            name: None,
            policy: BatchPolicy::default(),
            schedules: Vec::new(),
            show_repeats_individually: false,
            repeat_key: RepeatKey::default(),
            processor,
            scheduler,
            status: None,
        }
    }

    /// Hands the event to the batcher responsible for its marker.
    pub fn accept(&self, event: LogEventRef) {
        self.batcher_for(event.marker.as_ref()).accept(event);
    }

    /// Batcher that receives events with `marker` (the default one if unscheduled).
    pub fn batcher_for(&self, marker: Option<&Marker>) -> &Arc<Batcher> {
        marker
            .and_then(|m| self.by_marker.get(m))
            .unwrap_or(&self.default)
    }

    /// Batcher for events without a scheduled marker.
    pub fn default_batcher(&self) -> &Arc<Batcher> {
        &self.default
    }

    /// Every batcher, default first.
    pub fn batchers(&self) -> impl Iterator<Item = &Arc<Batcher>> {
        std::iter::once(&self.default).chain(self.by_marker.values())
    }

    /// Flushes every batcher immediately.
    pub fn flush_now(&self) {
        for batcher in self.batchers() {
            batcher.flush_now();
        }
    }
}

/// Builder for [`MarkerThrottle`].
pub struct MarkerThrottleBuilder {
    name: Option<String>,
    policy: BatchPolicy,
    schedules: Vec<(Marker, ThrottleSchedule)>,
    show_repeats_individually: bool,
    repeat_key: RepeatKey,
    processor: ProcessorRef,
    scheduler: SchedulerRef,
    status: Option<Arc<StatusChannel>>,
}

impl MarkerThrottleBuilder {
    /// Base name; marker batchers are named `"<name>[<marker>]"`.
    #[inline]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Policy for the default batcher. Marker batchers reuse its idle
    /// threshold and maximum wait.
    #[inline]
    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Gives `marker` its own batcher with an escalating cooldown.
    ///
    /// A later schedule for the same marker replaces the earlier one.
    #[inline]
    pub fn with_marker_schedule(mut self, marker: Marker, schedule: ThrottleSchedule) -> Self {
        self.schedules.retain(|(m, _)| *m != marker);
        self.schedules.push((marker, schedule));
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

    /// Status channel for delivery failures.
    #[inline]
    pub fn with_status(mut self, status: Arc<StatusChannel>) -> Self {
        self.status = Some(status);
        self
    }

    fn batcher(&self, name: String) -> BatcherBuilder {
        let mut b = Batcher::builder(Arc::clone(&self.processor), Arc::clone(&self.scheduler))
            .with_name(name)
            .with_policy(self.policy)
            .with_show_repeats_individually(self.show_repeats_individually)
            .with_repeat_key(self.repeat_key);
        if let Some(status) = &self.status {
            b = b.with_status(Arc::clone(status));
        }
        b
    }

    /// Builds the default batcher and one batcher per scheduled marker.
    pub fn build(self) -> MarkerThrottle {
        let base = self
            .name
            .clone()
            .unwrap_or_else(|| self.processor.name().to_string());

        let default = self.batcher(base.clone()).build();
        let by_marker = self
            .schedules
            .iter()
            .map(|(marker, schedule)| {
                let batcher = self
                    .batcher(format!("{base}[{marker}]"))
                    .with_marker(marker.clone())
                    .with_cooldown(Cooldown::Escalating(schedule.clone()))
                    .build();
                (marker.clone(), batcher)
            })
            .collect();

        MarkerThrottle { default, by_marker }
    }
}
