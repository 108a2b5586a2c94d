//! Console logger implementation

use super::file_logger;
use super::traits::Logger;

/// Where informational lines are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InfoTarget {
    Stdout,
    Stderr,
}

/// A logger that outputs to the console
///
/// Every line is mirrored to the debug file log (when enabled), so a session
/// can be reconstructed after the terminal is gone.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    prefix: String,
    info_target: InfoTarget,
    show_debug: bool,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger {
    /// Create a new console logger with default prefix
    pub fn new() -> Self {
        Self::with_prefix("[toolchat]")
    }

    /// Create a console logger with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            info_target: InfoTarget::Stdout,
            show_debug: false,
        }
    }

    /// Keep stdout free; used when stdout carries the MCP protocol
    pub fn stderr_only(mut self) -> Self {
        self.info_target = InfoTarget::Stderr;
        self
    }

    /// Also print debug lines
    pub fn verbose(mut self, enabled: bool) -> Self {
        self.show_debug = enabled;
        self
    }
}

impl Logger for ConsoleLogger {
    fn debug(&self, message: &str) {
        file_logger::debug(&self.prefix, message);
        if self.show_debug {
            eprintln!("{} DEBUG: {}", self.prefix, message);
        }
    }

    fn info(&self, message: &str) {
        file_logger::info(&self.prefix, message);
        match self.info_target {
            InfoTarget::Stdout => println!("{} {}", self.prefix, message),
            InfoTarget::Stderr => eprintln!("{} {}", self.prefix, message),
        }
    }

    fn warn(&self, message: &str) {
        file_logger::warn(&self.prefix, message);
        eprintln!("{} WARN: {}", self.prefix, message);
    }

    fn error(&self, message: &str) {
        file_logger::error(&self.prefix, message);
        eprintln!("{} ERROR: {}", self.prefix, message);
    }
}
