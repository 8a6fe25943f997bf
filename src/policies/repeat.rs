//! # Repeat detection for batch formatting.
//!
//! Consecutive events with the same key collapse into one
//! [`BatchEntry`](crate::BatchEntry) with a repeat count, unless the batch
//! asks for repeats to be shown individually.

use crate::event::LogEvent;

/// Which event fields make two consecutive events "the same".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RepeatKey {
    /// Logger, level, template and every argument (default).
    #[default]
    Full,
    /// Logger, level and template; arguments may differ.
    Template,
}

impl RepeatKey {
    /// True if `a` and `b` are repeats of each other under this key.
    pub fn same(&self, a: &LogEvent, b: &LogEvent) -> bool {
        let base = a.logger == b.logger && a.level == b.level && a.template == b.template;
        match self {
            RepeatKey::Full => base && a.args == b.args,
            RepeatKey::Template => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Level;

    #[test]
    fn test_full_compares_arguments() {
        let a = LogEvent::new("x", Level::Warn, "about {}").with_args(["one"]);
        let b = LogEvent::new("x", Level::Warn, "about {}").with_args(["two"]);
        assert!(!RepeatKey::Full.same(&a, &b));
        assert!(RepeatKey::Template.same(&a, &b));
    }

    #[test]
    fn test_level_and_logger_always_matter() {
        let a = LogEvent::new("x", Level::Warn, "boom");
        let b = LogEvent::new("x", Level::Error, "boom");
        let c = LogEvent::new("y", Level::Warn, "boom");
        assert!(!RepeatKey::Template.same(&a, &b));
        assert!(!RepeatKey::Template.same(&a, &c));
    }
}
