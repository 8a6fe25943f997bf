//! # logvisor
//!
//! **Logvisor** is a logging back-end for Rust applications that talk to noisy
//! sinks: chat webhooks, pagers, databases. Loggers form a dot-separated tree
//! with inherited thresholds and observers; batching observers gather events,
//! wait for the burst to go quiet, respect a cooldown between deliveries and
//! escalate the cooldown for markers that keep firing.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   logger("app.billing").warn(..)      logger("app.db").at(Level::Error).marker(..).log(..)
//!                │                                      │
//!                └──────────── is_enabled? ─────────────┘   (threshold walk, nothing built if not)
//!                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  LoggerRegistry (dispatch tree)                                   │
//! │  - effective threshold = nearest ancestor with one (root = INFO)  │
//! │  - effective observer  = nearest ancestor with one                │
//! │  - observer panics caught, reported to the StatusChannel          │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//!                      CompositeObserver (fan-out)
//!                 ┌──────────────┴───────────────┐
//!                 ▼                              ▼
//!          ConsoleObserver               FilteredObserver (threshold, suppress, require)
//!             (stdout)                           ▼
//!                                        BatchingObserver
//!                                                ▼
//!                                         MarkerThrottle ── marker? ──┐
//!                                                ▼                    ▼
//!                                         Batcher (default)    Batcher (escalating cooldown)
//!                                                └────────┬───────────┘
//!                                                         ▼
//!                                              BatchProcessor::process_batch(Batch)
//! ```
//!
//! ### Batcher lifecycle
//! ```text
//! Idle ──accept──► Open ──idle elapsed / max wait──► Flushing ──► deliver(batch)
//!                   ▲                                                   │
//!                   │      events arrived during flush: next flush at   │
//!                   └──────────────── last flush + cooldown ◄───────────┤
//!                                                                       │
//! Idle ◄── cooldown elapsed ── Cooldown ◄──── batch was empty ──────────┘
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                                  |
//! |-------------------|--------------------------------------------------------------|-----------------------------------------------------|
//! | **Loggers**       | Hierarchical thresholds and observers, fluent events.        | [`LoggerRegistry`], [`Logger`], [`EventBuilder`]    |
//! | **Observers**     | Filtering, fan-out, console output, batching.                | [`Observer`], [`FilteredObserver`], [`CompositeObserver`] |
//! | **Batching**      | Idle threshold, cooldown, maximum wait, marker escalation.   | [`Batcher`], [`MarkerThrottle`], [`BatchProcessor`] |
//! | **Scheduling**    | Real-time (tokio) and virtual-time timers.                   | [`Scheduler`], [`TokioScheduler`], [`ManualScheduler`] |
//! | **Status**        | Internal failures, bounded and observable.                   | [`StatusChannel`], [`StatusRecord`]                 |
//! | **Configuration** | Properties with ISO-8601 durations and unknown-key checks.   | [`Properties`], [`ObserverConfig`], [`SystemConfig`] |
//! | **Errors**        | Typed setup and delivery errors.                             | [`ConfigError`], [`DeliveryError`], [`SetupError`]  |
//!
//! ## Optional features
//! - `json` (default): [`JsonBatchFormatter`] renders a batch as a chat webhook payload.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use logvisor::{
//!     Batch, BatchPolicy, DeliveryError, Level, LogSystem, Marker, ObserverConfig,
//!     ProcessorFn, SystemConfig, ThrottleSchedule,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let system = LogSystem::builder(SystemConfig::default()).build()?;
//!
//!     let alerts = ObserverConfig::default()
//!         .with_name("alerts")
//!         .with_threshold(Level::Warn)
//!         .with_batch(BatchPolicy::default().with_idle_threshold(Duration::from_secs(3)))
//!         .with_marker_schedule(
//!             Marker::new("DB"),
//!             ThrottleSchedule::new(
//!                 "DB",
//!                 vec![Duration::from_secs(60), Duration::from_secs(600)],
//!             )?,
//!         );
//!     let observer = system.batching_observer(
//!         &alerts,
//!         ProcessorFn::arc("stdout", |batch: Batch| {
//!             println!("{} event(s), worst {:?}", batch.len(), batch.highest_level());
//!             Ok::<(), DeliveryError>(())
//!         }),
//!     );
//!     system.registry().set_observer("app", observer);
//!
//!     system.logger("app.db").warn("pool exhausted after {} ms", &[&250]);
//!
//!     // Flush whatever is still open before exiting.
//!     system.shutdown();
//!     Ok(())
//! }
//! ```
mod batch;
mod config;
mod error;
mod event;
mod format;
mod logger;
mod observers;
mod policies;
mod runtime;
mod scheduler;
mod status;

// ---- Public re-exports ----

pub use batch::{
    Batch, BatchEntry, BatchProcessor, Batcher, BatcherBuilder, BatcherPhase, Cooldown,
    MarkerThrottle, MarkerThrottleBuilder, ProcessorFn, ProcessorRef,
};
pub use config::{logger_settings, Configuration, LoggerSetting, ObserverConfig, Properties};
pub use error::{ConfigError, DeliveryError, SetupError};
pub use event::{mdc, render_template, ErrorPayload, Level, LogEvent, LogEventRef, Marker, ParseLevelError};
pub use format::ConsoleFormatter;
pub use logger::{normalize, EventBuilder, Logger, LoggerConfiguration, LoggerRegistry};
pub use observers::{
    BatchingObserver, CompositeObserver, ConsoleObserver, FilteredObserver, NullObserver, Observer,
    ObserverFn, ObserverRef,
};
pub use policies::{format_duration, parse_duration, BatchPolicy, RepeatKey, ThrottleSchedule};
pub use runtime::{
    wait_for_shutdown_signal, LogSystem, LogSystemBuilder, ShutdownHook, SystemConfig,
    CONSOLE_OBSERVER,
};
pub use scheduler::{Callback, ManualScheduler, ScheduleHandle, Scheduler, SchedulerRef, TokioScheduler};
pub use status::{StatusChannel, StatusLevel, StatusRecord, DEFAULT_STATUS_CAPACITY};

// Optional: chat webhook payloads.
// Enable with: `--features json` (on by default)
#[cfg(feature = "json")]
pub use format::{Attachment, ChatMessage, Field, JsonBatchFormatter};
