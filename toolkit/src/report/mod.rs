//! Diagnostic reporting.
//!
//! Components never log through global state: each one holds a
//! `&dyn Reporter` handed in by the caller. The binary passes a
//! [`ConsoleReporter`] (backed by `tracing`); tests pass a [`MemoryReporter`]
//! and assert on what was reported.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Log level for reported entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into() }
    }
}

/// Sink for diagnostics emitted by the validator, processor and analyzer.
pub trait Reporter {
    /// Record one entry.
    fn log(&self, entry: LogEntry);

    fn info(&self, message: &str) {
        self.log(LogEntry::info(message));
    }

    fn success(&self, message: &str) {
        self.log(LogEntry::success(message));
    }

    fn warning(&self, message: &str) {
        self.log(LogEntry::warning(message));
    }

    fn error(&self, message: &str) {
        self.log(LogEntry::error(message));
    }
}

/// Forwards entries to `tracing` under the `delicense` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for ConsoleReporter {
    fn log(&self, entry: LogEntry) {
        match entry.level {
            LogLevel::Info => tracing::info!(target: "delicense", "{}", entry.message),
            LogLevel::Success => tracing::info!(target: "delicense", "✓ {}", entry.message),
            LogLevel::Warning => tracing::warn!(target: "delicense", "{}", entry.message),
            LogLevel::Error => tracing::error!(target: "delicense", "{}", entry.message),
        }
    }
}

/// Keeps every entry in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: RefCell<Vec<LogEntry>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    /// Messages reported at `level`, in order.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }

    /// Whether any entry at `level` contains `needle`.
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl Reporter for MemoryReporter {
    fn log(&self, entry: LogEntry) {
        self.entries.borrow_mut().push(entry);
    }
}
