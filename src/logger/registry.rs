//! # Logger registry: hierarchical threshold and observer resolution.
//!
//! Loggers are named with dots (`com.example.billing`); each name is a node in
//! a tree rooted at `""`. A node may set its own threshold and observer;
//! anything it leaves unset is inherited from the nearest ancestor that sets
//! it. The root always sets both.
//!
//! ## Architecture
//! ```text
//! ""  (root: INFO, console)
//!  └─ com
//!      └─ com.example               threshold=DEBUG
//!          └─ com.example.billing   observer=slack
//!
//! resolve_threshold("com.example.billing") → DEBUG   (from com.example)
//! resolve_observer("com.example.billing")  → slack   (own)
//! resolve_observer("com.example")          → console (from root)
//! ```
//!
//! ## Rules
//! - Resolution walks `a.b.c → a.b → a → ""` by slicing the name; no allocation.
//! - Names are normalized by trimming surrounding dots and whitespace; an
//!   empty name is the root.
//! - Changes take effect on the next call for the node and every descendant
//!   that does not override the value.
//! - Observer panics during dispatch are caught and reported to the status
//!   channel with the logger name as component.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;

use super::Logger;
use crate::event::{Level, LogEventRef};
use crate::observers::{NullObserver, ObserverRef};
use crate::status::{panic_message, StatusChannel};

const ROOT: &str = "";

#[derive(Default)]
struct Node {
    threshold: Option<Level>,
    observer: Option<ObserverRef>,
    children: BTreeSet<String>,
}

/// Snapshot of one logger's effective configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggerConfiguration {
    /// Normalized logger name (`""` for root).
    pub name: String,
    /// Effective threshold.
    pub threshold: Level,
    /// Logger the threshold is inherited from (itself when set locally).
    pub threshold_from: String,
    /// Description of the effective observer.
    pub observer: String,
    /// Logger the observer is inherited from (itself when set locally).
    pub observer_from: String,
}

impl fmt::Display for LoggerConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.name.is_empty() { "<root>" } else { &self.name };
        write!(f, "{name} threshold={} observer={}", self.threshold, self.observer)
    }
}

/// Tree of logger nodes.
pub struct LoggerRegistry {
    nodes: RwLock<HashMap<String, Node>>,
    status: Arc<StatusChannel>,
}

impl fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("loggers", &self.nodes.read().len())
            .finish()
    }
}

/// Trims surrounding dots and whitespace.
pub fn normalize(name: &str) -> &str {
    name.trim_matches(|c: char| c == '.' || c.is_whitespace())
}

/// Parent of a normalized name (`None` for root).
fn parent(name: &str) -> Option<&str> {
    if name.is_empty() {
        return None;
    }
    Some(name.rfind('.').map_or(ROOT, |idx| &name[..idx]))
}

impl LoggerRegistry {
    /// Registry whose root has threshold INFO and `root_observer`.
    pub fn new(root_observer: ObserverRef, status: Arc<StatusChannel>) -> Arc<Self> {
        let mut nodes = HashMap::new();
        nodes.insert(
            ROOT.to_string(),
            Node {
                threshold: Some(Level::Info),
                observer: Some(root_observer),
                children: BTreeSet::new(),
            },
        );
        Arc::new(Self {
            nodes: RwLock::new(nodes),
            status,
        })
    }

    /// Handle for the logger `name`, registering it in the tree.
    pub fn logger(self: &Arc<Self>, name: &str) -> Logger {
        let name = normalize(name);
        if !self.nodes.read().contains_key(name) {
            let mut nodes = self.nodes.write();
            Self::ensure(&mut nodes, name);
        }
        Logger::new(Arc::from(name), Arc::clone(self))
    }

    /// Status channel dispatch failures are reported to.
    pub fn status(&self) -> &Arc<StatusChannel> {
        &self.status
    }

    fn ensure<'n>(nodes: &'n mut HashMap<String, Node>, name: &str) -> &'n mut Node {
        if !nodes.contains_key(name) {
            nodes.insert(name.to_string(), Node::default());
            let mut child = name;
            while let Some(p) = parent(child) {
                let known = nodes.contains_key(p);
                nodes
                    .entry(p.to_string())
                    .or_default()
                    .children
                    .insert(child.to_string());
                if known {
                    break;
                }
                child = p;
            }
        }
        nodes.entry(name.to_string()).or_default()
    }

    fn resolve<T>(&self, name: &str, pick: impl Fn(&Node) -> Option<T>) -> Option<(T, String)> {
        let nodes = self.nodes.read();
        let mut current = Some(normalize(name));
        while let Some(n) = current {
            if let Some(value) = nodes.get(n).and_then(&pick) {
                return Some((value, n.to_string()));
            }
            current = parent(n);
        }
        None
    }

    /// Effective threshold of `name`.
    pub fn resolve_threshold(&self, name: &str) -> Level {
        let nodes = self.nodes.read();
        let mut current = Some(normalize(name));
        while let Some(n) = current {
            if let Some(level) = nodes.get(n).and_then(|node| node.threshold) {
                return level;
            }
            current = parent(n);
        }
        Level::Info
    }

    /// Effective observer of `name`.
    pub fn resolve_observer(&self, name: &str) -> ObserverRef {
        let nodes = self.nodes.read();
        let mut current = Some(normalize(name));
        while let Some(n) = current {
            if let Some(obs) = nodes.get(n).and_then(|node| node.observer.as_ref()) {
                return Arc::clone(obs);
            }
            current = parent(n);
        }
        Arc::new(NullObserver)
    }

    /// True when `level >= resolve_threshold(name)`.
    #[inline]
    pub fn is_enabled(&self, name: &str, level: Level) -> bool {
        level >= self.resolve_threshold(name)
    }

    /// Sets the threshold of `name`.
    pub fn set_threshold(&self, name: &str, level: Level) {
        let mut nodes = self.nodes.write();
        Self::ensure(&mut nodes, normalize(name)).threshold = Some(level);
    }

    /// Sets the observer of `name`.
    pub fn set_observer(&self, name: &str, observer: ObserverRef) {
        let mut nodes = self.nodes.write();
        Self::ensure(&mut nodes, normalize(name)).observer = Some(observer);
    }

    /// Reverts `name` to inheriting its threshold. The root cannot be cleared.
    pub fn clear_threshold(&self, name: &str) -> bool {
        let name = normalize(name);
        if name == ROOT {
            return false;
        }
        let mut nodes = self.nodes.write();
        nodes
            .get_mut(name)
            .and_then(|node| node.threshold.take())
            .is_some()
    }

    /// Reverts `name` to inheriting its observer. The root cannot be cleared.
    pub fn clear_observer(&self, name: &str) -> bool {
        let name = normalize(name);
        if name == ROOT {
            return false;
        }
        let mut nodes = self.nodes.write();
        nodes
            .get_mut(name)
            .and_then(|node| node.observer.take())
            .is_some()
    }

    /// Direct children of `name` that have been registered or configured.
    pub fn children(&self, name: &str) -> Vec<String> {
        self.nodes
            .read()
            .get(normalize(name))
            .map(|node| node.children.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Every known logger name, sorted (root first).
    pub fn logger_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Effective configuration of `name`.
    pub fn describe(&self, name: &str) -> LoggerConfiguration {
        let (threshold, threshold_from) = self
            .resolve(name, |n| n.threshold)
            .unwrap_or((Level::Info, ROOT.to_string()));
        let (observer, observer_from) = self
            .resolve(name, |n| n.observer.as_ref().map(|o| o.describe()))
            .unwrap_or_else(|| ("null".to_string(), ROOT.to_string()));
        LoggerConfiguration {
            name: normalize(name).to_string(),
            threshold,
            threshold_from,
            observer,
            observer_from,
        }
    }

    /// Hands `event` to the observer of `name`, containing any panic.
    pub fn dispatch(&self, name: &str, event: &LogEventRef) {
        let observer = self.resolve_observer(name);
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| observer.log_event(event))) {
            self.status.report_error(
                normalize(name),
                format!(
                    "observer {} panicked: {}",
                    observer.name(),
                    panic_message(&*panic)
                ),
                None,
            );
        }
    }
}
