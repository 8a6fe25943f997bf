//! # Batch delivery interface.
//!
//! A [`BatchProcessor`] receives finished batches from a batcher and delivers
//! them somewhere: a chat webhook, a database, a terminal. Formatting and
//! transport live entirely behind this trait.
//!
//! ## Rules
//! - Called on the scheduler's execution context, never on a producer thread.
//! - Called with no batcher lock held; blocking here only delays later flushes
//!   of the same batcher.
//! - Errors and panics are reported to the status channel and the batch is
//!   dropped. Retrying, if wanted, happens inside the processor.
//!
//! ## Example
//! ```rust
//! use logvisor::{Batch, DeliveryError, ProcessorFn, ProcessorRef};
//!
//! let printer: ProcessorRef = ProcessorFn::arc("stdout", |batch: Batch| {
//!     for ev in &batch {
//!         println!("{} {}", ev.level, ev.message());
//!     }
//!     Ok::<(), DeliveryError>(())
//! });
//! assert_eq!(printer.name(), "stdout");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use super::Batch;
use crate::error::DeliveryError;

/// Shared processor handle.
pub type ProcessorRef = Arc<dyn BatchProcessor>;

/// Receives finished batches.
pub trait BatchProcessor: Send + Sync + 'static {
    /// Delivers one batch. The batch is never empty.
    fn process_batch(&self, batch: Batch) -> Result<(), DeliveryError>;

    /// Name used as the status-channel component.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Function-backed processor.
pub struct ProcessorFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> fmt::Debug for ProcessorFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorFn").field("name", &self.name).finish()
    }
}

impl<F> ProcessorFn<F> {
    /// Creates a new function-backed processor.
    ///
    /// Prefer [`ProcessorFn::arc`] when you immediately need a [`ProcessorRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the processor and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> BatchProcessor for ProcessorFn<F>
where
    F: Fn(Batch) -> Result<(), DeliveryError> + Send + Sync + 'static,
{
    fn process_batch(&self, batch: Batch) -> Result<(), DeliveryError> {
        (self.f)(batch)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
