//! # Properties and prefixed configuration reader.
//!
//! [`Properties`] is a flat, ordered `key=value` map as read from a
//! `.properties` file or the environment. [`Configuration`] is a view of the
//! keys under one prefix (`observer.slack.`) that remembers which keys were
//! read, so [`Configuration::check_for_unknown_fields`] can reject typos.
//!
//! ```text
//! observer.slack.threshold=WARN
//! observer.slack.idleThreshold=PT3S
//! observer.slack.markers.AUDIT.throttle=PT1M PT10M PT30M
//! observer.slack.idelThreshold=PT5S        ← reported as unknown
//! ```
//!
//! Reading never panics; malformed values become [`ConfigError`]s naming the
//! full key.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use crate::error::ConfigError;
use crate::event::{Level, Marker};
use crate::policies::parse_duration;

/// Flat ordered key/value map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `.properties`-style text: `key=value` (or `key: value`) per line,
    /// `#`/`!` comments, blank lines ignored, keys and values trimmed.
    pub fn parse(text: &str) -> Self {
        let mut props = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let (key, value) = match line.find(['=', ':']) {
                Some(pos) => (&line[..pos], &line[pos + 1..]),
                None => (line, ""),
            };
            props.insert(key.trim(), value.trim());
        }
        props
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Builder form of [`insert`](Self::insert).
    #[inline]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Keys starting with `prefix`, in order.
    pub fn keys_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
            .map(|(k, _)| k.as_str())
            .take_while(move |k| k.starts_with(prefix))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// View of the keys under one prefix.
#[derive(Debug)]
pub struct Configuration<'a> {
    props: &'a Properties,
    prefix: String,
    read: RefCell<BTreeSet<String>>,
}

impl<'a> Configuration<'a> {
    /// View of `props` under `prefix` (a trailing `.` is added when missing).
    pub fn new(props: &'a Properties, prefix: &str) -> Self {
        let mut prefix = prefix.trim().to_string();
        if !prefix.is_empty() && !prefix.ends_with('.') {
            prefix.push('.');
        }
        Self {
            props,
            prefix,
            read: RefCell::new(BTreeSet::new()),
        }
    }

    /// Prefix including the trailing dot.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Full key for `key`.
    pub fn full_key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    /// Raw value, trimmed; empty values count as absent.
    pub fn optional_string(&self, key: &str) -> Option<String> {
        let full = self.full_key(key);
        let value = self.props.get(&full).map(str::trim).filter(|v| !v.is_empty());
        self.read.borrow_mut().insert(full);
        value.map(str::to_string)
    }

    /// Required raw value.
    pub fn string(&self, key: &str) -> Result<String, ConfigError> {
        self.optional_string(key).ok_or_else(|| ConfigError::Missing {
            key: self.full_key(key),
        })
    }

    /// Comma-separated list; blank entries skipped, absent key → empty list.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        self.optional_string(key)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Comma-separated marker list.
    pub fn markers(&self, key: &str) -> Vec<Marker> {
        self.string_list(key)
            .iter()
            .map(|name| Marker::new(name))
            .collect()
    }

    /// `true`/`false` (case-insensitive); absent → `false`.
    pub fn boolean(&self, key: &str) -> Result<bool, ConfigError> {
        match self.optional_string(key) {
            None => Ok(false),
            Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
            Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
            Some(v) => Err(ConfigError::InvalidBool {
                key: self.full_key(key),
                value: v,
            }),
        }
    }

    /// ISO-8601 duration.
    pub fn duration(&self, key: &str) -> Result<Option<Duration>, ConfigError> {
        match self.optional_string(key) {
            None => Ok(None),
            Some(v) => parse_duration(&v)
                .map(Some)
                .ok_or_else(|| ConfigError::InvalidDuration {
                    key: self.full_key(key),
                    value: v,
                }),
        }
    }

    /// Level name (case-insensitive).
    pub fn level(&self, key: &str) -> Result<Option<Level>, ConfigError> {
        match self.optional_string(key) {
            None => Ok(None),
            Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidLevel {
                key: self.full_key(key),
                value: v,
            }),
        }
    }

    /// Distinct names `N` of keys shaped `<prefix><group>.N.<suffix>`.
    ///
    /// Used for `markers.<name>.throttle`.
    pub fn group_names(&self, group: &str, suffix: &str) -> Vec<String> {
        let group_prefix = format!("{}{group}.", self.prefix);
        let tail = format!(".{suffix}");
        let mut names: Vec<String> = self
            .props
            .keys_with_prefix(&group_prefix)
            .filter_map(|k| k[group_prefix.len()..].strip_suffix(tail.as_str()))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        names.dedup();
        names
    }

    /// Fails with every key under the prefix that was never read.
    pub fn check_for_unknown_fields(&self) -> Result<(), ConfigError> {
        let read = self.read.borrow();
        let fields: Vec<String> = self
            .props
            .keys_with_prefix(&self.prefix)
            .filter(|k| !read.contains(*k))
            .map(str::to_string)
            .collect();
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::UnknownFields { fields })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_properties_text() {
        let props = Properties::parse(
            "# comment\n\
             observer.slack.threshold = WARN\n\
             ! also a comment\n\
             observer.slack.idleThreshold: PT3S\n\
             \n\
             root=INFO\n",
        );
        assert_eq!(props.len(), 3);
        assert_eq!(props.get("observer.slack.threshold"), Some("WARN"));
        assert_eq!(props.get("observer.slack.idleThreshold"), Some("PT3S"));
        assert_eq!(props.get("root"), Some("INFO"));
    }

    #[test]
    fn test_typed_accessors() {
        let props = Properties::new()
            .with("o.threshold", "warn")
            .with("o.idleThreshold", "PT3S")
            .with("o.showRepeatsIndividually", "TRUE")
            .with("o.suppressMarkers", "A, B,,C");
        let cfg = Configuration::new(&props, "o");

        assert_eq!(cfg.level("threshold"), Ok(Some(Level::Warn)));
        assert_eq!(cfg.duration("idleThreshold"), Ok(Some(Duration::from_secs(3))));
        assert_eq!(cfg.duration("cooldownTime"), Ok(None));
        assert_eq!(cfg.boolean("showRepeatsIndividually"), Ok(true));
        assert_eq!(cfg.string_list("suppressMarkers"), vec!["A", "B", "C"]);
        assert!(cfg.check_for_unknown_fields().is_ok());
    }

    #[test]
    fn test_errors_name_full_key() {
        let props = Properties::new()
            .with("o.idleThreshold", "3 seconds")
            .with("o.threshold", "LOUD");
        let cfg = Configuration::new(&props, "o.");
        assert_eq!(
            cfg.duration("idleThreshold"),
            Err(ConfigError::InvalidDuration {
                key: "o.idleThreshold".into(),
                value: "3 seconds".into(),
            })
        );
        assert!(matches!(cfg.level("threshold"), Err(ConfigError::InvalidLevel { .. })));
        assert_eq!(
            cfg.string("url"),
            Err(ConfigError::Missing { key: "o.url".into() })
        );
    }

    #[test]
    fn test_unknown_fields() {
        let props = Properties::new()
            .with("o.idleThreshold", "PT3S")
            .with("o.idelThreshold", "PT5S")
            .with("other.key", "x");
        let cfg = Configuration::new(&props, "o");
        let _ = cfg.duration("idleThreshold");
        assert_eq!(
            cfg.check_for_unknown_fields(),
            Err(ConfigError::UnknownFields {
                fields: vec!["o.idelThreshold".into()]
            })
        );
    }

    #[test]
    fn test_group_names() {
        let props = Properties::new()
            .with("o.markers.AUDIT.throttle", "PT1M")
            .with("o.markers.SECURITY.throttle", "PT1M")
            .with("o.markers.OTHER.color", "red");
        let cfg = Configuration::new(&props, "o");
        assert_eq!(cfg.group_names("markers", "throttle"), vec!["AUDIT", "SECURITY"]);
    }
}
