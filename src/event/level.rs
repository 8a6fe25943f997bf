//! # Severity levels.
//!
//! [`Level`] is totally ordered: `Trace < Debug < Info < Warn < Error`.
//! A logger emits an event when `level >= threshold`.

use std::fmt;
use std::str::FromStr;

/// Severity of a log event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "UPPERCASE"))]
pub enum Level {
    /// Finest-grained diagnostics.
    Trace,
    /// Developer diagnostics.
    Debug,
    /// Normal operation (default root threshold).
    Info,
    /// Something unexpected that the application survived.
    Warn,
    /// A failure that needs attention.
    Error,
}

impl Level {
    /// All levels, lowest first.
    pub const ALL: [Level; 5] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
    ];

    /// Upper-case name (`"WARN"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

impl Default for Level {
    /// Returns [`Level::Info`], the root threshold.
    fn default() -> Self {
        Level::Info
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Returned when a string does not name a level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(pub String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown level {:?}", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Level::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseLevelError(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("warn".parse::<Level>(), Ok(Level::Warn));
        assert_eq!(" Error ".parse::<Level>(), Ok(Level::Error));
        assert!("loud".parse::<Level>().is_err());
    }

    #[test]
    fn test_display_pads() {
        assert_eq!(format!("{:<5}", Level::Warn), "WARN ");
        assert_eq!(Level::Info.to_string(), "INFO");
    }
}
