//! # Batches of events.
//!
//! A [`Batch`] is the ordered set of events a batcher collected between
//! opening and flushing. Once handed to a [`BatchProcessor`](super::BatchProcessor)
//! it is owned by the processor and never touched by the engine again.
//!
//! [`Batch::entries`] is the formatting view: consecutive repeats collapse into
//! one [`BatchEntry`] with a count, unless `show_repeats_individually` is set.
//!
//! ```text
//! events:  A(x) A(x) A(x) B C(y) C(z)
//! entries: A(x)×3  B×1  C(y)×1  C(z)×1     (RepeatKey::Full)
//! entries: A(x)×3  B×1  C(y)×2             (RepeatKey::Template)
//! ```

use chrono::{DateTime, Utc};

use crate::event::{Level, LogEventRef, Marker};
use crate::policies::RepeatKey;

/// Ordered events collected between batch open and flush.
#[derive(Clone, Debug, Default)]
pub struct Batch {
    events: Vec<LogEventRef>,
    marker: Option<Marker>,
    opened_at: Option<DateTime<Utc>>,
    show_repeats_individually: bool,
    repeat_key: RepeatKey,
}

/// One line of a formatted batch: an event and how many consecutive repeats it stands for.
#[derive(Clone, Copy, Debug)]
pub struct BatchEntry<'a> {
    /// First event of the run.
    pub event: &'a LogEventRef,
    /// Last event of the run (same as `event` when `repeats == 1`).
    pub last: &'a LogEventRef,
    /// Number of events in the run (≥ 1).
    pub repeats: usize,
}

impl Batch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the marker this batch is collected for.
    pub fn with_marker(mut self, marker: Option<Marker>) -> Self {
        self.marker = marker;
        self
    }

    /// Asks formatters to list repeated events one by one.
    pub fn with_show_repeats_individually(mut self, show: bool) -> Self {
        self.show_repeats_individually = show;
        self
    }

    /// Sets what counts as a repeated event.
    pub fn with_repeat_key(mut self, key: RepeatKey) -> Self {
        self.repeat_key = key;
        self
    }

    /// Appends an event, recording the open time on the first one.
    pub fn push(&mut self, event: LogEventRef) {
        if self.events.is_empty() {
            self.opened_at = Some(Utc::now());
        }
        self.events.push(event);
    }

    /// Empty batch with the same formatting options.
    pub(crate) fn fresh(&self) -> Self {
        Self {
            events: Vec::new(),
            marker: self.marker.clone(),
            opened_at: None,
            show_repeats_individually: self.show_repeats_individually,
            repeat_key: self.repeat_key,
        }
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if no events were collected.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events in insertion order.
    pub fn events(&self) -> &[LogEventRef] {
        &self.events
    }

    /// Iterates events in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, LogEventRef> {
        self.events.iter()
    }

    /// Marker the batch was collected for, if it came from a marker throttle.
    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    /// Wall-clock time of the first event's arrival.
    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        self.opened_at
    }

    /// Whether formatters should list repeats individually.
    pub fn show_repeats_individually(&self) -> bool {
        self.show_repeats_individually
    }

    /// Repeat key used by [`entries`](Self::entries).
    pub fn repeat_key(&self) -> RepeatKey {
        self.repeat_key
    }

    /// Highest level present.
    pub fn highest_level(&self) -> Option<Level> {
        self.events.iter().map(|e| e.level).max()
    }

    /// Formatting view: consecutive repeats collapsed unless shown individually.
    pub fn entries(&self) -> Vec<BatchEntry<'_>> {
        let mut out: Vec<BatchEntry<'_>> = Vec::with_capacity(self.events.len());
        for event in &self.events {
            if !self.show_repeats_individually {
                if let Some(prev) = out.last_mut() {
                    if self.repeat_key.same(prev.event, event) {
                        prev.last = event;
                        prev.repeats += 1;
                        continue;
                    }
                }
            }
            out.push(BatchEntry {
                event,
                last: event,
                repeats: 1,
            });
        }
        out
    }

    /// The entry a headline should describe: the first one at the highest level.
    pub fn main_entry(&self) -> Option<BatchEntry<'_>> {
        let highest = self.highest_level()?;
        self.entries().into_iter().find(|e| e.event.level == highest)
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a LogEventRef;
    type IntoIter = std::slice::Iter<'a, LogEventRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
