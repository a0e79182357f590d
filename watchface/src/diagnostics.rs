//! On-watch diagnostic log.
//!
//! Every entry is forwarded to the `log` facade and also kept in a small ring so the
//! application state can be inspected after the fact.
use std::collections::VecDeque;

use log::Level;

/// Entries kept before the oldest is discarded.
pub const DIAGNOSTIC_CAPACITY: usize = 64;

/// One logged event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity.
    pub level: Level,
    /// Human-readable text.
    pub message: String,
}

/// Bounded ring of recent diagnostics.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: VecDeque<Diagnostic>,
}

impl DiagnosticLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry and forward it to `log`.
    pub fn record(&mut self, level: Level, message: impl Into<String>) {
        let message = message.into();
        log::log!(target: "watchface::app", level, "{}", message);
        if self.entries.len() == DIAGNOSTIC_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(Diagnostic { level, message });
    }

    /// Shorthand for an error entry.
    pub fn error(&mut self, message: impl Into<String>) {
        self.record(Level::Error, message);
    }

    /// Shorthand for an info entry.
    pub fn info(&mut self, message: impl Into<String>) {
        self.record(Level::Info, message);
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of retained entries at `level`.
    pub fn count(&self, level: Level) -> usize {
        self.entries.iter().filter(|d| d.level == level).count()
    }
}
