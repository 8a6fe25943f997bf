//! # Shutdown: flush open batches, wait for OS signals.
//!
//! [`ShutdownHook`] keeps weak references to every batching observer a
//! [`LogSystem`](super::LogSystem) created; [`ShutdownHook::flush_all`]
//! forces an immediate flush of each one, bypassing idle and cooldown, so no
//! buffered event is lost on exit.
//!
//! [`wait_for_shutdown_signal`] completes when the process receives a
//! termination signal.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal)
//!
//! **Other platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::observers::BatchingObserver;

/// Weak registry of batching observers to flush on shutdown.
#[derive(Debug, Default)]
pub struct ShutdownHook {
    targets: Mutex<Vec<Weak<BatchingObserver>>>,
}

impl ShutdownHook {
    /// Empty hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer`; dropped observers are pruned automatically.
    pub fn register(&self, observer: &Arc<BatchingObserver>) {
        let mut targets = self.targets.lock();
        targets.retain(|w| w.strong_count() > 0);
        targets.push(Arc::downgrade(observer));
    }

    /// Live registered observers.
    pub fn len(&self) -> usize {
        self.targets
            .lock()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// True when no live observer is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flushes every live observer on the calling thread; returns how many.
    pub fn flush_all(&self) -> usize {
        let live: Vec<Arc<BatchingObserver>> = self
            .targets
            .lock()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for observer in &live {
            observer.flush_now();
        }
        live.len()
    }
}

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
