//! Progress logging for migration runs.
//!
//! The engine reports progress through the [`Logger`] capability it is
//! constructed with. Logging never fails and never aborts an operation.

use parking_lot::Mutex;
use std::sync::Arc;

/// Progress logger consumed by the engine and by migrations.
pub trait Logger: Send + Sync {
    /// Report an informational progress message.
    fn info(&self, message: &str);

    /// Report a warning. Defaults to [`Logger::info`].
    fn warn(&self, message: &str) {
        self.info(message);
    }
}

/// Logger that forwards to `tracing` under the `stride` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "stride", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "stride", "{}", message);
    }
}

/// Level of a recorded log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Informational.
    Info,
    /// Warning.
    Warn,
}

/// In-memory logger that records every line.
#[derive(Debug, Default, Clone)]
pub struct MemoryLogger {
    lines: Arc<Mutex<Vec<(LogLevel, String)>>>,
}

impl MemoryLogger {
    /// Create a new memory logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages, in order.
    pub fn messages(&self) -> Vec<String> {
        self.lines.lock().iter().map(|(_, m)| m.clone()).collect()
    }

    /// All recorded lines with their level.
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().clone()
    }

    /// Check whether any message equals `message`.
    pub fn contains(&self, message: &str) -> bool {
        self.lines.lock().iter().any(|(_, m)| m == message)
    }

    /// Clear all lines.
    pub fn clear(&self) {
        self.lines.lock().clear();
    }

    /// Number of recorded lines.
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl Logger for MemoryLogger {
    fn info(&self, message: &str) {
        self.lines.lock().push((LogLevel::Info, message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.lines.lock().push((LogLevel::Warn, message.to_string()));
    }
}

/// Logger that discards all messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn info(&self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_logger() {
        let logger = MemoryLogger::new();
        logger.info("first");
        logger.warn("second");

        assert_eq!(logger.len(), 2);
        assert_eq!(logger.messages(), vec!["first", "second"]);
        assert_eq!(logger.lines()[1].0, LogLevel::Warn);
        assert!(logger.contains("first"));

        logger.clear();
        assert!(logger.is_empty());
    }

    #[test]
    fn test_memory_logger_clones_share_lines() {
        let logger = MemoryLogger::new();
        let shared = logger.clone();
        shared.info("from clone");
        assert!(logger.contains("from clone"));
    }

    #[test]
    fn test_default_warn_uses_info() {
        struct Counting(Mutex<usize>);
        impl Logger for Counting {
            fn info(&self, _message: &str) {
                *self.0.lock() += 1;
            }
        }

        let logger = Counting(Mutex::new(0));
        logger.warn("careful");
        assert_eq!(*logger.0.lock(), 1);
    }
}
