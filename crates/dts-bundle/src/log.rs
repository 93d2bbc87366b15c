//! Leveled logging for a generation run
//!
//! Every stage reports through a [`Reporter`]. The console implementation writes
//! colored lines to stderr with `termcolor`; the collecting implementation keeps
//! them in memory so tests can assert on warnings.

use std::fmt;
use std::io::Write;
use std::str::FromStr;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use thiserror::Error;

/// Log severity, ordered from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Verbose,
    Debug,
}

impl LogLevel {
    /// All levels, most severe first
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Verbose,
        LogLevel::Debug,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Verbose => "verbose",
            LogLevel::Debug => "debug",
        }
    }

    fn color(self) -> Option<Color> {
        match self {
            LogLevel::Error => Some(Color::Red),
            LogLevel::Warn => Some(Color::Yellow),
            LogLevel::Info => Some(Color::Cyan),
            LogLevel::Verbose => Some(Color::White),
            LogLevel::Debug => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a log level name is not recognized
#[derive(Debug, Error)]
#[error("Unknown log level '{0}' (expected one of: error, warn, info, verbose, debug)")]
pub struct UnknownLogLevel(pub String);

impl FromStr for LogLevel {
    type Err = UnknownLogLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownLogLevel(s.to_string()))
    }
}

/// Sink for log lines emitted during a generation run
pub trait Reporter {
    fn report(&mut self, level: LogLevel, message: &str);

    fn error(&mut self, message: &str) {
        self.report(LogLevel::Error, message);
    }

    fn warn(&mut self, message: &str) {
        self.report(LogLevel::Warn, message);
    }

    fn info(&mut self, message: &str) {
        self.report(LogLevel::Info, message);
    }

    fn verbose(&mut self, message: &str) {
        self.report(LogLevel::Verbose, message);
    }

    fn debug(&mut self, message: &str) {
        self.report(LogLevel::Debug, message);
    }
}

/// Colored stderr reporter with a severity threshold.
pub struct ConsoleReporter {
    stderr: StandardStream,
    threshold: LogLevel,
}

impl ConsoleReporter {
    pub fn new(threshold: LogLevel, choice: ColorChoice) -> Self {
        Self {
            stderr: StandardStream::stderr(choice),
            threshold,
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, level: LogLevel, message: &str) {
        if level > self.threshold {
            return;
        }

        let mut spec = ColorSpec::new();
        spec.set_fg(level.color()).set_bold(level <= LogLevel::Warn);
        let _ = self.stderr.set_color(&spec);
        let _ = write!(self.stderr, "[{}]", level);
        let _ = self.stderr.reset();
        let _ = writeln!(self.stderr, " {}", message);
    }
}

/// Reporter that keeps every line in memory.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    pub entries: Vec<(LogLevel, String)>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages logged at exactly `level`
    pub fn messages(&self, level: LogLevel) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.messages(LogLevel::Warn)
    }
}

impl Reporter for CollectingReporter {
    fn report(&mut self, level: LogLevel, message: &str) {
        self.entries.push((level, message.to_string()));
    }
}

/// Reporter that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&mut self, _level: LogLevel, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("VERBOSE".parse::<LogLevel>().unwrap(), LogLevel::Verbose);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Verbose < LogLevel::Debug);
    }

    #[test]
    fn test_collecting_reporter() {
        let mut reporter = CollectingReporter::new();
        reporter.warn("first");
        reporter.info("second");
        reporter.warn("third");

        assert_eq!(reporter.warnings(), vec!["first", "third"]);
        assert_eq!(reporter.messages(LogLevel::Info), vec!["second"]);
    }
}
