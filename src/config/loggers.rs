//! # Logger thresholds and observer bindings.
//!
//! ```text
//! root=WARN console
//! logger.com.example=DEBUG
//! logger.com.example.billing=INFO slack, console
//! ```
//!
//! The first token is the level; remaining tokens (comma or space separated)
//! name observers registered with the [`LogSystem`](crate::LogSystem).

use super::Properties;
use crate::error::ConfigError;
use crate::event::Level;

const LOGGER_PREFIX: &str = "logger.";

/// One `root` or `logger.<name>` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggerSetting {
    /// Logger name (empty for root).
    pub logger: String,
    /// Threshold to set.
    pub threshold: Level,
    /// Observer names to bind, in order (empty = keep inherited observer).
    pub observers: Vec<String>,
}

impl LoggerSetting {
    fn parse(logger: &str, key: &str, value: &str) -> Result<Self, ConfigError> {
        let mut tokens = value
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty());
        let level = tokens.next().ok_or_else(|| ConfigError::Missing {
            key: key.to_string(),
        })?;
        let threshold = level.parse().map_err(|_| ConfigError::InvalidLevel {
            key: key.to_string(),
            value: level.to_string(),
        })?;
        Ok(Self {
            logger: logger.to_string(),
            threshold,
            observers: tokens.map(str::to_string).collect(),
        })
    }
}

/// Reads `root` and every `logger.<name>` key, root first.
pub fn logger_settings(props: &Properties) -> Result<Vec<LoggerSetting>, ConfigError> {
    let mut out = Vec::new();
    if let Some(value) = props.get("root") {
        out.push(LoggerSetting::parse("", "root", value)?);
    }
    for key in props.keys_with_prefix(LOGGER_PREFIX) {
        let value = props.get(key).unwrap_or_default();
        out.push(LoggerSetting::parse(&key[LOGGER_PREFIX.len()..], key, value)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_root_and_loggers() {
        let props = Properties::parse(
            "root=WARN console\n\
             logger.com.example=debug\n\
             logger.com.example.billing=INFO slack, console\n\
             observer.slack.threshold=ERROR\n",
        );
        let settings = logger_settings(&props).expect("valid");
        assert_eq!(settings.len(), 3);
        assert_eq!(settings[0].logger, "");
        assert_eq!(settings[0].observers, vec!["console"]);
        assert_eq!(settings[1].threshold, Level::Debug);
        assert!(settings[1].observers.is_empty());
        assert_eq!(settings[2].logger, "com.example.billing");
        assert_eq!(settings[2].observers, vec!["slack", "console"]);
    }

    #[test]
    fn test_rejects_bad_level() {
        let props = Properties::new().with("logger.a", "LOUD");
        assert_eq!(
            logger_settings(&props),
            Err(ConfigError::InvalidLevel {
                key: "logger.a".into(),
                value: "LOUD".into()
            })
        );
    }
}
