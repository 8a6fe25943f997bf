//! # Markers: interned categorical tags.
//!
//! A [`Marker`] names a category of events (`"AUDIT"`, `"PAYMENT_FAILED"`).
//! Markers are interned so that cloning is a refcount bump; they compare and
//! hash by value, so two `Marker::new("AUDIT")` calls are always equal.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

static INTERNED: OnceLock<Mutex<HashSet<Arc<str>>>> = OnceLock::new();

fn intern(name: &str) -> Arc<str> {
    let table = INTERNED.get_or_init(|| Mutex::new(HashSet::new()));
    let mut table = table.lock();
    if let Some(existing) = table.get(name) {
        return Arc::clone(existing);
    }
    let name: Arc<str> = Arc::from(name);
    table.insert(Arc::clone(&name));
    name
}

/// Interned marker name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Marker(Arc<str>);

impl Marker {
    /// Returns the interned marker for `name` (surrounding whitespace trimmed).
    pub fn new(name: &str) -> Self {
        Marker(intern(name.trim()))
    }

    /// Marker name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Marker {
    fn from(name: &str) -> Self {
        Marker::new(name)
    }
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Marker({})", self.0)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(feature = "json")]
impl serde::Serialize for Marker {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
