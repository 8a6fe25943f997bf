//! # LogSystem: the assembled logging back-end.
//!
//! A [`LogSystem`] owns the logger tree, the status channel, the scheduler
//! batchers arm their timers on, a table of named observers and the
//! [`ShutdownHook`] that flushes every batching observer on exit.
//!
//! ## Architecture
//! ```text
//! LogSystemBuilder::build()
//!   ├─► StatusChannel         (bounded, shared by every component)
//!   ├─► Scheduler             (tokio runtime, or ManualScheduler in tests)
//!   ├─► LoggerRegistry        (root = console observer)
//!   └─► named observers       { "console" }
//!
//! batching_observer(cfg, processor)
//!   └─► FilteredObserver ─► BatchingObserver ─► MarkerThrottle ─► BatchProcessor
//!             │                    └─► ShutdownHook (weak)
//!             └─► named observers[cfg.name]
//!
//! configure(props)
//!   └─► root / logger.<name> = LEVEL obs1, obs2
//!         └─► registry.set_threshold + registry.set_observer(combine(obs…))
//!
//! shutdown() / run_until_signal() / Drop
//!   └─► ShutdownHook::flush_all()   (bypasses idle and cooldown)
//! ```
//!
//! ## Rules
//! - Configuration is validated completely before any of it is applied.
//! - Loggers bound to no observer keep inheriting from their ancestors.
//! - Each system is independent; tests build private ones.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use logvisor::{
//!     Batch, DeliveryError, LogSystem, ManualScheduler, ProcessorFn, Properties, SystemConfig,
//! };
//!
//! let clock = Arc::new(ManualScheduler::new());
//! let system = LogSystem::builder(SystemConfig { install_console: false, ..Default::default() })
//!     .with_scheduler(clock.clone())
//!     .build()
//!     .unwrap();
//!
//! let props = Properties::parse(
//!     "observer.alerts.idleThreshold=PT3S\n\
//!      root=WARN alerts\n",
//! );
//! system
//!     .configure_observer(
//!         &props,
//!         "alerts",
//!         ProcessorFn::arc("print", |batch: Batch| {
//!             println!("{} events", batch.len());
//!             Ok::<(), DeliveryError>(())
//!         }),
//!     )
//!     .unwrap();
//! system.configure(&props).unwrap();
//!
//! system.logger("app").warn("disk at {}%", &[&91]);
//! clock.advance(Duration::from_secs(3));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::shutdown::{wait_for_shutdown_signal, ShutdownHook};
use super::{LogSystemBuilder, SystemConfig};
use crate::batch::ProcessorRef;
use crate::config::{logger_settings, Configuration, ObserverConfig, Properties};
use crate::error::SetupError;
use crate::event::Level;
use crate::logger::{Logger, LoggerRegistry};
use crate::observers::{BatchingObserver, CompositeObserver, Observer, ObserverRef};
use crate::scheduler::SchedulerRef;
use crate::status::StatusChannel;

/// Name the console observer is registered under.
pub const CONSOLE_OBSERVER: &str = "console";

const OBSERVER_PREFIX: &str = "observer";

/// Logger tree, observers, scheduler and status channel of one application.
pub struct LogSystem {
    cfg: SystemConfig,
    registry: Arc<LoggerRegistry>,
    status: Arc<StatusChannel>,
    scheduler: SchedulerRef,
    hook: ShutdownHook,
    observers: RwLock<HashMap<String, ObserverRef>>,
}

impl fmt::Debug for LogSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSystem")
            .field("cfg", &self.cfg)
            .field("observers", &self.observer_names())
            .field("batching", &self.hook.len())
            .finish()
    }
}

impl LogSystem {
    /// Starts a builder with `cfg`.
    pub fn builder(cfg: SystemConfig) -> LogSystemBuilder {
        LogSystemBuilder::new(cfg)
    }

    pub(super) fn new_internal(
        cfg: SystemConfig,
        root: ObserverRef,
        console: ObserverRef,
        scheduler: SchedulerRef,
        status: Arc<StatusChannel>,
    ) -> Self {
        let registry = LoggerRegistry::new(root, Arc::clone(&status));
        registry.set_threshold("", cfg.root_threshold);

        let mut observers = HashMap::new();
        observers.insert(CONSOLE_OBSERVER.to_string(), console);

        Self {
            cfg,
            registry,
            status,
            scheduler,
            hook: ShutdownHook::new(),
            observers: RwLock::new(observers),
        }
    }

    /// Configuration the system was built with.
    pub fn config(&self) -> &SystemConfig {
        &self.cfg
    }

    /// Logger handle for `name`.
    pub fn logger(&self, name: &str) -> Logger {
        self.registry.logger(name)
    }

    /// Logger tree.
    pub fn registry(&self) -> &Arc<LoggerRegistry> {
        &self.registry
    }

    /// Status channel.
    pub fn status(&self) -> &Arc<StatusChannel> {
        &self.status
    }

    /// Scheduler batching observers use.
    pub fn scheduler(&self) -> &SchedulerRef {
        &self.scheduler
    }

    /// Registers `observer` under `name`, replacing any previous one.
    pub fn register_observer(&self, name: impl Into<String>, observer: ObserverRef) {
        self.observers.write().insert(name.into(), observer);
    }

    /// Observer registered under `name`.
    pub fn observer(&self, name: &str) -> Option<ObserverRef> {
        self.observers.read().get(name).cloned()
    }

    /// Registered observer names, sorted.
    pub fn observer_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.observers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Builds a batching observer delivering to `processor`.
    ///
    /// The returned observer applies the configured filter. It is flushed by
    /// [`shutdown`](Self::shutdown) and, when `config.name` is set,
    /// registered under that name.
    pub fn batching_observer(&self, config: &ObserverConfig, processor: ProcessorRef) -> ObserverRef {
        let (batching, filtered) = BatchingObserver::from_config(
            config,
            processor,
            Arc::clone(&self.scheduler),
            Arc::clone(&self.status),
        );
        self.hook.register(&batching);
        if let Some(name) = &config.name {
            self.register_observer(name.clone(), Arc::clone(&filtered));
        }
        self.status
            .report_debug("system", format!("batching observer {} ready", batching.name()));
        filtered
    }

    /// Reads `observer.<name>.*` from `props` and builds a batching observer.
    ///
    /// Fails on malformed values, empty throttle schedules and keys under the
    /// prefix that are not understood.
    pub fn configure_observer(
        &self,
        props: &Properties,
        name: &str,
        processor: ProcessorRef,
    ) -> Result<ObserverRef, SetupError> {
        let prefix = format!("{OBSERVER_PREFIX}.{name}");
        let view = Configuration::new(props, &prefix);
        let config = ObserverConfig::parse(&view)?.with_name(name);
        view.check_for_unknown_fields()?;
        Ok(self.batching_observer(&config, processor))
    }

    /// Applies the `root` and `logger.<name>` settings in `props`.
    ///
    /// Every referenced observer must already be registered; nothing is
    /// changed if any setting is invalid.
    pub fn configure(&self, props: &Properties) -> Result<(), SetupError> {
        let settings = logger_settings(props)?;

        let mut resolved: Vec<(String, Level, Option<ObserverRef>)> = Vec::with_capacity(settings.len());
        {
            let observers = self.observers.read();
            for setting in settings {
                let mut bound = Vec::with_capacity(setting.observers.len());
                for name in &setting.observers {
                    let obs = observers.get(name).ok_or_else(|| SetupError::UnknownObserver {
                        name: name.clone(),
                        logger: setting.logger.clone(),
                    })?;
                    bound.push(Arc::clone(obs));
                }
                let observer = (!bound.is_empty())
                    .then(|| CompositeObserver::combine_with_status(bound, Arc::clone(&self.status)));
                resolved.push((setting.logger, setting.threshold, observer));
            }
        }

        for (logger, threshold, observer) in resolved {
            self.registry.set_threshold(&logger, threshold);
            if let Some(observer) = observer {
                self.registry.set_observer(&logger, observer);
            }
        }
        self.status.report_info("system", "logger configuration applied");
        Ok(())
    }

    /// Flushes every open batch immediately; returns the number of batching
    /// observers flushed.
    pub fn shutdown(&self) -> usize {
        let flushed = self.hook.flush_all();
        self.status
            .report_info("system", format!("shutdown flushed {flushed} batching observer(s)"));
        flushed
    }

    /// Waits for SIGINT, SIGTERM or SIGQUIT (Ctrl-C elsewhere), then shuts down.
    pub async fn run_until_signal(&self) -> Result<(), SetupError> {
        wait_for_shutdown_signal().await?;
        self.shutdown();
        Ok(())
    }
}

impl Drop for LogSystem {
    fn drop(&mut self) {
        self.hook.flush_all();
    }
}
