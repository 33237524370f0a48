//! Progress reporting for sync runs.
//!
//! The exporter and importer never print. They hand each line to a
//! [`SyncReporter`], which decides where it goes: the terminal for the CLI,
//! a buffer for tests.

use std::cell::RefCell;

use colored::Colorize;
use tracing::debug;

/// Receiver for the human-readable lines a sync run produces.
pub trait SyncReporter {
    /// Informational detail. The importer only sends these when verbose.
    fn log(&self, message: &str);

    /// A completed action or the final summary.
    fn success(&self, message: &str);

    /// A recoverable per-item failure.
    fn warning(&self, message: &str);
}

/// Reporter that writes to the terminal.
///
/// `log` and `success` go to stdout, or to stderr when `json` is set so that
/// stdout carries only the JSON summary. Warnings always go to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter {
    json: bool,
    quiet: bool,
}

impl ConsoleReporter {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }

    fn emit(&self, line: &str) {
        if self.json {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

impl SyncReporter for ConsoleReporter {
    fn log(&self, message: &str) {
        debug!(target: "psync::report", "{message}");
        if !self.quiet {
            self.emit(message);
        }
    }

    fn success(&self, message: &str) {
        debug!(target: "psync::report", "{message}");
        if !self.quiet {
            self.emit(&message.green().to_string());
        }
    }

    fn warning(&self, message: &str) {
        debug!(target: "psync::report", warning = true, "{message}");
        eprintln!("{} {message}", "Warning:".yellow().bold());
    }
}

/// Kind of a recorded line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Log,
    Success,
    Warning,
}

/// Reporter that keeps every line in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: RefCell<Vec<(ReportLevel, String)>>,
}

impl RecordingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every line received so far, in order.
    #[must_use]
    pub fn lines(&self) -> Vec<(ReportLevel, String)> {
        self.lines.borrow().clone()
    }

    /// Messages of a single level, in order.
    #[must_use]
    pub fn messages(&self, level: ReportLevel) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Whether any line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|(_, m)| m.contains(needle))
    }

    fn push(&self, level: ReportLevel, message: &str) {
        self.lines.borrow_mut().push((level, message.to_string()));
    }
}

impl SyncReporter for RecordingReporter {
    fn log(&self, message: &str) {
        self.push(ReportLevel::Log, message);
    }

    fn success(&self, message: &str) {
        self.push(ReportLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.push(ReportLevel::Warning, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_reporter_keeps_order_and_levels() {
        let reporter = RecordingReporter::new();
        reporter.log("scanning");
        reporter.warning("bad file");
        reporter.success("done");

        assert_eq!(reporter.lines().len(), 3);
        assert_eq!(reporter.messages(ReportLevel::Warning), vec!["bad file"]);
        assert_eq!(reporter.lines()[2], (ReportLevel::Success, "done".to_string()));
        assert!(reporter.contains("scan"));
        assert!(!reporter.contains("missing"));
    }
}
