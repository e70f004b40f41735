use super::{LogEntry, LogLevel};

/// Destination for drained log entries
pub trait LogSink: Send + Sync {
    fn emit(&self, entry: &LogEntry);
}

/// Forwards entries to `tracing`, tagged like console output
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, entry: &LogEntry) {
        match entry.level {
            LogLevel::Info => {
                tracing::info!(target: "catalog_enricher::scrape", "[INFO] {}", entry.message)
            }
            LogLevel::Error => {
                tracing::error!(target: "catalog_enricher::scrape", "[ERROR] {}", entry.message)
            }
        }
    }
}
