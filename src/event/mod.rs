//! Log event data model.
//!
//! ## Contents
//! - [`Level`]     ordered severity (`Trace < Debug < Info < Warn < Error`)
//! - [`Marker`]    interned category tag, compared by value
//! - [`LogEvent`]  immutable record of one log call, shared as [`LogEventRef`]
//! - [`mdc`]       per-thread context properties captured into each event

mod level;
mod log_event;
mod marker;
pub mod mdc;

pub use level::{Level, ParseLevelError};
pub use log_event::{render_template, ErrorPayload, LogEvent, LogEventRef};
pub(crate) use log_event::render_with;
pub use marker::Marker;
