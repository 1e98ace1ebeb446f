//! Run log: console output plus a retained history for the run summary.
//!
//! Every pipeline step reports through [`log_info`], [`log_success`],
//! [`log_warning`] and [`log_error`]. Entries are printed to stderr (unless the
//! sink is quiet) and kept so the CLI can embed them in the JSON summary.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Log level for console display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Optional indentation level (for nested logs)
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Console rendering of this entry.
    pub fn render(&self) -> String {
        let prefix = match self.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        };
        let indent = "   ".repeat(self.indent as usize);
        format!("{}{} {}", indent, prefix, self.message)
    }
}

/// Entries kept by [`LOG_SINK`] before the oldest are dropped
pub const HISTORY_LIMIT: usize = 10_000;

/// Global log sink
pub static LOG_SINK: Lazy<LogSink> = Lazy::new(LogSink::new);

/// Prints log entries and keeps the most recent ones for the run summary
pub struct LogSink {
    entries: Mutex<VecDeque<LogEntry>>,
    limit: usize,
    quiet: AtomicBool,
}

impl LogSink {
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    /// Sink keeping at most `limit` entries
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            limit,
            quiet: AtomicBool::new(false),
        }
    }

    /// Record an entry, printing it unless quiet
    pub fn log(&self, entry: LogEntry) {
        if !self.quiet.load(Ordering::Relaxed) {
            eprintln!("{}", entry.render());
        }
        if let Ok(mut entries) = self.entries.lock() {
            if self.limit == 0 {
                return;
            }
            while entries.len() >= self.limit {
                entries.pop_front();
            }
            entries.push_back(entry);
        }
    }

    /// Stop (or resume) printing; entries are still recorded
    pub fn set_quiet(&self, quiet: bool) {
        self.quiet.store(quiet, Ordering::Relaxed);
    }

    /// Take every entry recorded so far
    pub fn drain(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(mut entries) => entries.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    LOG_SINK.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOG_SINK.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOG_SINK.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOG_SINK.log(LogEntry::error(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOG_SINK.log(LogEntry::info(msg).with_indent(indent));
}

pub fn log_warning_indent(msg: impl Into<String>, indent: u8) {
    LOG_SINK.log(LogEntry::warning(msg).with_indent(indent));
}
