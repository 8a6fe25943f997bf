//! Configuration.
//!
//! Reading configuration *files* is the caller's business; this module turns
//! already-loaded key/value pairs into typed settings and fails early.
//!
//! ## Contents
//! - [`Properties`]      flat ordered key/value map (`.properties` text parser included)
//! - [`Configuration`]   prefixed view with typed accessors and unknown-key detection
//! - [`ObserverConfig`]  threshold, batching, marker filters and throttle schedules
//! - [`LoggerSetting`]   `root` / `logger.<name>` thresholds and observer bindings

mod loggers;
mod observer;
mod properties;

pub use loggers::{logger_settings, LoggerSetting};
pub use observer::ObserverConfig;
pub use properties::{Configuration, Properties};
