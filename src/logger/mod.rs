//! Logger dispatch tree.
//!
//! - [`LoggerRegistry`]  hierarchical thresholds and observers, dispatch with panic isolation
//! - [`Logger`]          named handle with level helpers
//! - [`EventBuilder`]    fluent event construction (`logger.at(Level::Warn).marker(..).log(..)`)

#[allow(clippy::module_inception)]
mod logger;
mod registry;

pub use logger::{EventBuilder, Logger};
pub use registry::{normalize, LoggerConfiguration, LoggerRegistry};
