//! Batching engine.
//!
//! Turns a stream of events into time-bounded batches and hands them to a
//! [`BatchProcessor`].
//!
//! ## Contents
//! - [`Batch`], [`BatchEntry`]        ordered events plus the repeat-collapsing view
//! - [`BatchProcessor`], [`ProcessorFn`]  delivery interface and closure adapter
//! - [`Batcher`]                      idle / cooldown / max-wait state machine
//! - [`MarkerThrottle`]               per-marker batchers with escalating cooldowns
//!
//! ## Flow
//! ```text
//! accept(event) ─► MarkerThrottle ─► Batcher (lock: append + arm timers)
//!                                        │ timer fires on scheduler
//!                                        ▼
//!                           swap batch (lock) ─► process_batch(batch) (no lock)
//!                                                      │ Err / panic
//!                                                      ▼
//!                                               StatusChannel
//! ```

#[allow(clippy::module_inception)]
mod batch;
mod batcher;
mod processor;
mod throttle;

pub use batch::{Batch, BatchEntry};
pub use batcher::{Batcher, BatcherBuilder, BatcherPhase, Cooldown};
pub use processor::{BatchProcessor, ProcessorFn, ProcessorRef};
pub use throttle::{MarkerThrottle, MarkerThrottleBuilder};
