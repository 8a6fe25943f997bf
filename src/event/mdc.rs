//! # Per-thread context properties (MDC).
//!
//! Values put here are captured into every [`LogEvent`](super::LogEvent)
//! created on the same thread, as an ordered snapshot.
//!
//! ```rust
//! use logvisor::mdc;
//!
//! let _guard = mdc::put_scoped("clientIp", "10.0.0.7");
//! assert_eq!(mdc::get("clientIp").as_deref(), Some("10.0.0.7"));
//! drop(_guard);
//! assert_eq!(mdc::get("clientIp"), None);
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;

thread_local! {
    static CONTEXT: RefCell<BTreeMap<String, String>> = const { RefCell::new(BTreeMap::new()) };
}

/// Sets `key` for the current thread, replacing any previous value.
pub fn put(key: impl Into<String>, value: impl Into<String>) {
    CONTEXT.with(|ctx| {
        ctx.borrow_mut().insert(key.into(), value.into());
    });
}

/// Returns the current thread's value for `key`.
pub fn get(key: &str) -> Option<String> {
    CONTEXT.with(|ctx| ctx.borrow().get(key).cloned())
}

/// Removes `key` for the current thread.
pub fn remove(key: &str) -> Option<String> {
    CONTEXT.with(|ctx| ctx.borrow_mut().remove(key))
}

/// Removes every key for the current thread.
pub fn clear() {
    CONTEXT.with(|ctx| ctx.borrow_mut().clear());
}

/// Copy of the current thread's properties.
pub fn snapshot() -> BTreeMap<String, String> {
    CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Sets `key` and restores the previous value when the guard drops.
#[must_use = "the property is removed as soon as the guard is dropped"]
pub fn put_scoped(key: impl Into<String>, value: impl Into<String>) -> MdcGuard {
    let key = key.into();
    let previous = CONTEXT.with(|ctx| ctx.borrow_mut().insert(key.clone(), value.into()));
    MdcGuard { key, previous }
}

/// Restores a property on drop. See [`put_scoped`].
pub struct MdcGuard {
    key: String,
    previous: Option<String>,
}

impl Drop for MdcGuard {
    fn drop(&mut self) {
        let key = std::mem::take(&mut self.key);
        match self.previous.take() {
            Some(prev) => put(key, prev),
            None => {
                remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_restores_previous() {
        clear();
        put("user", "alice");
        {
            let _g = put_scoped("user", "bob");
            assert_eq!(get("user").as_deref(), Some("bob"));
        }
        assert_eq!(get("user").as_deref(), Some("alice"));
        clear();
    }

    #[test]
    fn test_snapshot_is_ordered() {
        clear();
        put("b", "2");
        put("a", "1");
        let keys: Vec<_> = snapshot().into_keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        clear();
    }

    #[test]
    fn test_threads_are_isolated() {
        clear();
        put("op", "main");
        let seen = std::thread::spawn(|| get("op")).join().unwrap();
        assert_eq!(seen, None);
        clear();
    }
}
