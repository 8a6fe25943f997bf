//! Batching and throttling policies.
//!
//! This module groups the knobs that control **when** a batch is flushed and
//! **how long** to hold back after a flush.
//!
//! ## Contents
//! - [`BatchPolicy`]       idle threshold / cooldown / maximum wait
//! - [`ThrottleSchedule`]  escalating per-marker cooldowns
//! - [`RepeatKey`]         what counts as a repeated event when formatting a batch
//! - [`parse_duration`]    ISO-8601 duration literals used by configuration
//!
//! ## Quick wiring
//! ```text
//! ObserverConfig { batch: BatchPolicy, markers: { name → ThrottleSchedule } }
//!      └─► BatchingObserver
//!           - default Batcher with Cooldown::Fixed(batch.cooldown_time)
//!           - one Batcher per marker with Cooldown::Escalating(schedule)
//! ```
//!
//! ## Defaults
//! - `BatchPolicy::default()` → idle=5s, cooldown=15s, max wait=1min.
//! - `RepeatKey::Full` (logger + level + template + arguments).

mod batch;
mod duration;
mod repeat;
mod throttle;

pub use batch::BatchPolicy;
pub use duration::{format_duration, parse_duration};
pub use repeat::RepeatKey;
pub use throttle::ThrottleSchedule;
