//! # Console line formatter.
//!
//! Renders one event per line:
//!
//! ```text
//! 14:03:27.118 [main] [WARN ] [com.example.Billing] {user=alice}: charge 42 failed
//! ```
//!
//! With ANSI enabled the level is coloured (ERROR bold red, WARN red, INFO
//! blue), the logger name is bold and substituted arguments are underlined.
//! An attached error and its `source()` chain follow on separate lines.

use std::fmt::Write as _;

use chrono::Local;

use crate::event::{render_with, Level, LogEvent};

const RESET: &str = "\x1b[m";
const BOLD: &str = "\x1b[1m";
const UNDERLINE: &str = "\x1b[4m";
const BOLD_RED: &str = "\x1b[1;31m";
const RED: &str = "\x1b[31m";
const BLUE: &str = "\x1b[34m";

/// Formats events as single console lines.
#[derive(Clone, Debug)]
pub struct ConsoleFormatter {
    ansi: bool,
    utc: bool,
    included_mdc_keys: Option<Vec<String>>,
}

impl Default for ConsoleFormatter {
    fn default() -> Self {
        Self {
            ansi: true,
            utc: false,
            included_mdc_keys: None,
        }
    }
}

impl ConsoleFormatter {
    /// Formatter with ANSI colours and local time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables ANSI escape codes.
    #[inline]
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Prints timestamps in UTC instead of local time.
    #[inline]
    pub fn with_utc(mut self, utc: bool) -> Self {
        self.utc = utc;
        self
    }

    /// Only print these context keys (all keys when unset).
    #[inline]
    pub fn with_included_mdc_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.included_mdc_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// True if escape codes are emitted.
    pub fn ansi(&self) -> bool {
        self.ansi
    }

    /// Formats one event, including the trailing newline.
    pub fn format(&self, event: &LogEvent) -> String {
        let time = if self.utc {
            event.timestamp.format("%H:%M:%S%.3f").to_string()
        } else {
            event.timestamp.with_timezone(&Local).format("%H:%M:%S%.3f").to_string()
        };

        let mut out = String::with_capacity(96 + event.template.len());
        let _ = writeln!(
            out,
            "{time} [{}] [{}] [{}]{}: {}",
            event.thread,
            self.level(event.level),
            self.bold(&event.logger),
            self.mdc(event),
            self.message(event),
        );

        if let Some(err) = &event.error {
            let _ = writeln!(out, "{err}");
            let mut source = err.source();
            while let Some(cause) = source {
                let _ = writeln!(out, "Caused by: {cause}");
                source = cause.source();
            }
        }
        out
    }

    /// Level name padded to five columns, coloured when ANSI is on.
    pub fn level(&self, level: Level) -> String {
        let padded = format!("{level:<5}");
        if !self.ansi {
            return padded;
        }
        match level {
            Level::Error => format!("{BOLD_RED}{padded}{RESET}"),
            Level::Warn => format!("{RED}{padded}{RESET}"),
            Level::Info => format!("{BLUE}{padded}{RESET}"),
            Level::Debug | Level::Trace => padded,
        }
    }

    fn bold(&self, s: &str) -> String {
        if self.ansi {
            format!("{BOLD}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    fn message(&self, event: &LogEvent) -> String {
        if !self.ansi {
            return event.message();
        }
        render_with(&event.template, &event.args, |out, arg| {
            out.push_str(UNDERLINE);
            out.push_str(arg);
            out.push_str(RESET);
        })
    }

    fn mdc(&self, event: &LogEvent) -> String {
        let pairs: Vec<String> = event
            .mdc
            .iter()
            .filter(|(k, _)| match &self.included_mdc_keys {
                Some(keys) => keys.iter().any(|inc| inc == *k),
                None => true,
            })
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        if pairs.is_empty() {
            String::new()
        } else {
            format!(" {{{}}}", pairs.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn event() -> LogEvent {
        LogEvent::new("com.example.Billing", Level::Warn, "charge {} failed")
            .with_args(["42"])
            .with_thread("main")
            .with_timestamp(Utc.with_ymd_and_hms(2024, 5, 1, 14, 3, 27).unwrap())
    }

    #[test]
    fn test_plain_line() {
        let f = ConsoleFormatter::new().with_ansi(false).with_utc(true);
        assert_eq!(
            f.format(&event()),
            "14:03:27.000 [main] [WARN ] [com.example.Billing]: charge 42 failed\n"
        );
    }

    #[test]
    fn test_ansi_codes() {
        let f = ConsoleFormatter::new().with_utc(true);
        let line = f.format(&event());
        assert!(line.contains("\x1b[31mWARN \x1b[m"));
        assert!(line.contains("\x1b[1mcom.example.Billing\x1b[m"));
        assert!(line.contains("charge \x1b[4m42\x1b[m failed"));
        assert_eq!(f.level(Level::Error), "\x1b[1;31mERROR\x1b[m");
        assert_eq!(f.level(Level::Info), "\x1b[34mINFO \x1b[m");
        assert_eq!(f.level(Level::Debug), "DEBUG");
    }

    #[test]
    fn test_mdc_filtering() {
        let ev = event()
            .with_property("user", "alice")
            .with_property("ip", "10.0.0.1");
        let all = ConsoleFormatter::new().with_ansi(false).with_utc(true);
        assert!(all.format(&ev).contains("] {ip=10.0.0.1, user=alice}: "));

        let some = all.with_included_mdc_keys(["user"]);
        assert!(some.format(&ev).contains("] {user=alice}: "));
    }

    #[test]
    fn test_error_chain() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let outer = crate::error::DeliveryError::Unavailable {
            reason: inner.to_string(),
        };
        let ev = event().with_error(std::sync::Arc::new(outer));
        let f = ConsoleFormatter::new().with_ansi(false).with_utc(true);
        let text = f.format(&ev);
        assert!(text.ends_with("disk full\n"));
        assert_eq!(text.lines().count(), 2);
    }
}
