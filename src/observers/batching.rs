//! # BatchingObserver: the observer face of the batching engine
//!
//! Adapts a [`MarkerThrottle`] to the [`Observer`] trait. Sink-specific
//! behaviour (Slack, Teams, database) lives entirely in the
//! [`BatchProcessor`](crate::BatchProcessor) the throttle delivers to.
//!
//! ```text
//! FilteredObserver (threshold, suppress, require)
//!      └─► BatchingObserver
//!             └─► MarkerThrottle ─► Batcher(s) ─► BatchProcessor
//! ```
//!
//! Built directly, or from an [`ObserverConfig`] with
//! [`BatchingObserver::from_config`], which applies the filter too.

use std::sync::Arc;

use super::{Observer, ObserverRef};
use crate::batch::{MarkerThrottle, ProcessorRef};
use crate::config::ObserverConfig;
use crate::event::LogEventRef;
use crate::scheduler::SchedulerRef;
use crate::status::StatusChannel;

/// Observer that batches events before delivery.
#[derive(Debug)]
pub struct BatchingObserver {
    name: String,
    throttle: MarkerThrottle,
}

impl BatchingObserver {
    /// Wraps an already built throttle.
    pub fn new(throttle: MarkerThrottle) -> Self {
        let name = throttle.default_batcher().name().to_string();
        Self { name, throttle }
    }

    /// Builds the throttle described by `config`.
    ///
    /// Returns the batching observer (keep it to flush on shutdown) and the
    /// filtered observer to install on a logger.
    pub fn from_config(
        config: &ObserverConfig,
        processor: ProcessorRef,
        scheduler: SchedulerRef,
        status: Arc<StatusChannel>,
    ) -> (Arc<BatchingObserver>, ObserverRef) {
        let mut builder = MarkerThrottle::builder(processor, scheduler)
            .with_policy(config.batch)
            .with_show_repeats_individually(config.show_repeats_individually)
            .with_repeat_key(config.repeat_key)
            .with_status(status);
        if let Some(name) = &config.name {
            builder = builder.with_name(name.clone());
        }
        for (marker, schedule) in &config.marker_schedules {
            builder = builder.with_marker_schedule(marker.clone(), schedule.clone());
        }

        let batching = Arc::new(BatchingObserver::new(builder.build()));
        let filtered = config.filter(Arc::clone(&batching) as ObserverRef);
        (batching, Arc::new(filtered) as ObserverRef)
    }

    /// Underlying throttle.
    pub fn throttle(&self) -> &MarkerThrottle {
        &self.throttle
    }

    /// Flushes every open batch now.
    pub fn flush_now(&self) {
        self.throttle.flush_now();
    }
}

impl Observer for BatchingObserver {
    fn log_event(&self, event: &LogEventRef) {
        self.throttle.accept(Arc::clone(event));
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn describe(&self) -> String {
        let policy = self.throttle.default_batcher().policy();
        format!(
            "Batching{{{},idle={:?},cooldown={:?},maxWait={:?}}}",
            self.name, policy.idle_threshold, policy.cooldown_time, policy.maximum_wait_time
        )
    }
}
