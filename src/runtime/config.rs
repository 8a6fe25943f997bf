//! # System-wide configuration.
//!
//! Provides [`SystemConfig`], the settings a [`LogSystem`](super::LogSystem)
//! is assembled with.
//!
//! ## Sentinel values
//! - `ansi = None` → colours only when stdout is a terminal

use crate::event::Level;
use crate::status::DEFAULT_STATUS_CAPACITY;

/// Settings for a [`LogSystem`](super::LogSystem).
///
/// ## Field semantics
/// - `root_threshold`: threshold of the root logger
/// - `status_capacity`: records the status channel retains (min 1)
/// - `ansi`: force console colours on/off (`None` = detect)
/// - `install_console`: register the console observer as the root observer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemConfig {
    /// Threshold of the root logger; every logger without its own inherits it.
    pub root_threshold: Level,

    /// Number of status records retained before the oldest are dropped.
    pub status_capacity: usize,

    /// Console colours.
    ///
    /// - `None` = only when stdout is a terminal
    /// - `Some(b)` = forced
    pub ansi: Option<bool>,

    /// Whether the root observer is the console (otherwise [`NullObserver`](crate::NullObserver)
    /// until one is set).
    pub install_console: bool,
}

impl SystemConfig {
    /// Status capacity clamped to a minimum of 1.
    #[inline]
    pub fn status_capacity_clamped(&self) -> usize {
        self.status_capacity.max(1)
    }
}

impl Default for SystemConfig {
    /// Default configuration:
    ///
    /// - `root_threshold = INFO`
    /// - `status_capacity = 1000`
    /// - `ansi = None` (detect)
    /// - `install_console = true`
    fn default() -> Self {
        Self {
            root_threshold: Level::Info,
            status_capacity: DEFAULT_STATUS_CAPACITY,
            ansi: None,
            install_console: true,
        }
    }
}
