//! Rolling diagnostic log
//!
//! The buffer doubles as a local ring log and as the "recent activity"
//! context shipped with every error report. Eviction is checked before the
//! push, so a full buffer holds `MAX_LOG_SIZE + 1` entries.

use std::collections::VecDeque;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Eviction threshold for [`LogBuffer`]
pub const MAX_LOG_SIZE: usize = 100;

/// Severity/kind of a log entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    #[default]
    Info,
    Error,
    ErrorObject,
    Transition,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Info => "info",
            LogLevel::Error => "error",
            LogLevel::ErrorObject => "error-object",
            LogLevel::Transition => "transition",
        };
        write!(f, "{}", s)
    }
}

/// One diagnostic entry. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub payload: Value,
    pub level: LogLevel,
}

/// Bounded FIFO of recent [`LogEntry`] values.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    max_size: usize,
}

impl LogBuffer {
    /// Creates an empty buffer with the default [`MAX_LOG_SIZE`].
    pub fn new() -> Self {
        Self::with_max_size(MAX_LOG_SIZE)
    }

    /// Creates an empty buffer with a custom eviction threshold.
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_size.min(MAX_LOG_SIZE).saturating_add(1)),
            max_size,
        }
    }

    /// Appends `payload`, evicting the oldest entry first if the buffer is
    /// over its threshold. `level` defaults to [`LogLevel::Info`].
    pub fn append(&mut self, payload: Value, level: Option<LogLevel>) -> &LogEntry {
        if self.entries.len() > self.max_size {
            self.entries.pop_front();
        }

        self.entries.push_back(LogEntry {
            timestamp: Utc::now().timestamp_millis(),
            payload,
            level: level.unwrap_or_default(),
        });

        // just pushed
        &self.entries[self.entries.len() - 1]
    }

    /// Current contents, oldest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}
