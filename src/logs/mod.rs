//! Request-scoped diagnostic log
//!
//! Every scrape request owns a [`RequestLog`]. Entries recorded on it are kept
//! in an ordered buffer that is returned to the caller, and are also drained
//! one at a time into a [`LogSink`] so that console lines never interleave.

mod aggregator;
mod sink;

pub use aggregator::RequestLog;
pub use sink::{LogSink, TracingSink};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a diagnostic entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single diagnostic line as returned in the `logs` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }
}
