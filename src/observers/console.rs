//! # ConsoleObserver: print events as they happen
//!
//! The default root observer. Formats each event with [`ConsoleFormatter`]
//! and writes it to stdout, or to any injected writer.
//!
//! ## Example output
//! ```text
//! 14:03:27.118 [main] [INFO ] [app.startup]: listening on 0.0.0.0:8080
//! 14:03:29.502 [worker-2] [WARN ] [app.db] {request=7f3a}: slow query took 812ms
//! ```
//!
//! Write failures go to the status channel; the event is lost.

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use super::Observer;
use crate::event::LogEventRef;
use crate::format::ConsoleFormatter;
use crate::status::StatusChannel;

/// Writes formatted events to a terminal or writer.
pub struct ConsoleObserver {
    formatter: ConsoleFormatter,
    out: Mutex<Box<dyn Write + Send>>,
    status: Arc<StatusChannel>,
}

impl ConsoleObserver {
    /// Writes to stdout, with colours only when stdout is a terminal.
    pub fn stdout() -> Self {
        let ansi = io::stdout().is_terminal();
        Self::with_writer(io::stdout(), ConsoleFormatter::new().with_ansi(ansi))
    }

    /// Writes to `out` with `formatter`.
    pub fn with_writer(out: impl Write + Send + 'static, formatter: ConsoleFormatter) -> Self {
        Self {
            formatter,
            out: Mutex::new(Box::new(out)),
            status: StatusChannel::global(),
        }
    }

    /// Status channel for write failures.
    #[inline]
    pub fn with_status(mut self, status: Arc<StatusChannel>) -> Self {
        self.status = status;
        self
    }

    /// Formatter in use.
    pub fn formatter(&self) -> &ConsoleFormatter {
        &self.formatter
    }
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Observer for ConsoleObserver {
    fn log_event(&self, event: &LogEventRef) {
        let line = self.formatter.format(event);
        let mut out = self.out.lock();
        let written = match out.write_all(line.as_bytes()) {
            Ok(()) => out.flush(),
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            self.status
                .report_error("console", "failed to write event", Some(&e));
        }
    }

    fn name(&self) -> &str {
        "console"
    }

    fn describe(&self) -> String {
        format!("Console{{ansi={}}}", self.formatter.ansi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Level, LogEvent};
    use crate::status::StatusLevel;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writes_formatted_line() {
        let buf = Shared::default();
        let obs = ConsoleObserver::with_writer(buf.clone(), ConsoleFormatter::new().with_ansi(false));
        obs.log_event(&LogEvent::new("app", Level::Info, "hello {}").with_args(["world"]).into_ref());

        let text = String::from_utf8(buf.0.lock().clone()).expect("utf8");
        assert!(text.ends_with("[INFO ] [app]: hello world\n"), "{text}");
    }

    #[test]
    fn test_write_failure_is_reported() {
        let status = Arc::new(StatusChannel::new(8));
        let obs = ConsoleObserver::with_writer(Broken, ConsoleFormatter::new())
            .with_status(Arc::clone(&status));
        obs.log_event(&LogEvent::new("app", Level::Info, "lost").into_ref());

        let errors = status.at_least(StatusLevel::Error);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].cause.as_deref(), Some("closed"));
    }
}
