//! In-memory logger

use parking_lot::Mutex;

use super::file_logger::LogLevel;
use super::traits::Logger;

/// A logger that keeps every line in memory
///
/// Lets tests assert on what a component reported and at which level.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines so far, oldest first
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().clone()
    }

    /// Messages logged at exactly `level`
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Whether any line, at any level, equals `message`
    pub fn contains(&self, message: &str) -> bool {
        self.lines.lock().iter().any(|(_, m)| m == message)
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.lines.lock().push((level, message.to_string()));
    }
}

impl Logger for MemoryLogger {
    fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_lines_with_levels() {
        let logger = MemoryLogger::new();
        logger.info("connected");
        logger.error("lost");

        assert_eq!(logger.messages_at(LogLevel::Info), vec!["connected".to_string()]);
        assert_eq!(logger.messages_at(LogLevel::Error), vec!["lost".to_string()]);
        assert!(logger.contains("lost"));
        assert!(!logger.contains("los"));
    }
}
