//! Runtime assembly.
//!
//! - [`LogSystem`]          owns registry, status channel, scheduler and named observers
//! - [`LogSystemBuilder`]   optional overrides (root observer, scheduler, status channel)
//! - [`SystemConfig`]       root threshold, status capacity, console settings
//! - [`ShutdownHook`]       weak list of batching observers flushed on exit

mod builder;
mod config;
mod shutdown;
mod system;

pub use builder::LogSystemBuilder;
pub use config::SystemConfig;
pub use shutdown::{wait_for_shutdown_signal, ShutdownHook};
pub use system::{LogSystem, CONSOLE_OBSERVER};
