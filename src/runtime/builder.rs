use std::io::{self, IsTerminal};
use std::sync::Arc;

use super::{LogSystem, SystemConfig};
use crate::error::SetupError;
use crate::format::ConsoleFormatter;
use crate::observers::{ConsoleObserver, NullObserver, ObserverRef};
use crate::scheduler::{SchedulerRef, TokioScheduler};
use crate::status::StatusChannel;

/// Builder for a [`LogSystem`] with optional overrides.
pub struct LogSystemBuilder {
    cfg: SystemConfig,
    root_observer: Option<ObserverRef>,
    scheduler: Option<SchedulerRef>,
    status: Option<Arc<StatusChannel>>,
}

impl LogSystemBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SystemConfig) -> Self {
        Self {
            cfg,
            root_observer: None,
            scheduler: None,
            status: None,
        }
    }

    /// Sets the root observer instead of the console.
    #[inline]
    pub fn with_root_observer(mut self, observer: ObserverRef) -> Self {
        self.root_observer = Some(observer);
        self
    }

    /// Sets the scheduler batchers arm their timers on.
    ///
    /// Tests pass a [`ManualScheduler`](crate::ManualScheduler) here.
    #[inline]
    pub fn with_scheduler(mut self, scheduler: SchedulerRef) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Shares an existing status channel (otherwise a private one is created
    /// with `status_capacity`).
    #[inline]
    pub fn with_status(mut self, status: Arc<StatusChannel>) -> Self {
        self.status = Some(status);
        self
    }

    /// Builds the system.
    ///
    /// Without an explicit scheduler this uses the calling tokio runtime, or
    /// starts a dedicated one, which may fail with [`SetupError::Io`].
    pub fn build(self) -> Result<LogSystem, SetupError> {
        let status = self
            .status
            .unwrap_or_else(|| Arc::new(StatusChannel::new(self.cfg.status_capacity_clamped())));

        let scheduler = match self.scheduler {
            Some(s) => s,
            None => Arc::new(TokioScheduler::current_or_dedicated()?) as SchedulerRef,
        };

        let console: ObserverRef = {
            let ansi = self.cfg.ansi.unwrap_or_else(|| io::stdout().is_terminal());
            Arc::new(
                ConsoleObserver::with_writer(io::stdout(), ConsoleFormatter::new().with_ansi(ansi))
                    .with_status(Arc::clone(&status)),
            )
        };

        let root = match self.root_observer {
            Some(o) => o,
            None if self.cfg.install_console => Arc::clone(&console),
            None => Arc::new(NullObserver),
        };

        Ok(LogSystem::new_internal(self.cfg, root, console, scheduler, status))
    }
}
