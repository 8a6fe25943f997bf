//! Observers: filtering, fan-out, console output and batching.
//!
//! ## Contents
//! - [`Observer`], [`ObserverFn`]  the trait and a closure adapter
//! - [`FilteredObserver`]          level threshold + suppress/require markers
//! - [`CompositeObserver`]         ordered fan-out with panic isolation
//! - [`ConsoleObserver`]           formatted lines on stdout (default root observer)
//! - [`NullObserver`]              drops everything
//! - [`BatchingObserver`]          batching engine behind the observer interface

mod batching;
mod composite;
mod console;
mod filtered;
mod observer;

pub use batching::BatchingObserver;
pub use composite::CompositeObserver;
pub use console::ConsoleObserver;
pub use filtered::FilteredObserver;
pub use observer::{NullObserver, Observer, ObserverFn, ObserverRef};
