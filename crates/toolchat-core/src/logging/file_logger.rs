//! Debug file log
//!
//! A process-wide sink that appends every log line to a file. The chat
//! terminal is interactive and the tool server's stdout is the protocol
//! stream, so a file is the only place a full trace of a session can go.
//!
//! Disabled unless `TOOLCHAT_DEBUG` is `1`/`true`. `TOOLCHAT_LOG_LEVEL` sets
//! the minimum level and `TOOLCHAT_LOG_FILE` overrides the path (default:
//! `<tmp>/toolchat-debug.log`).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::SystemTime;

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// Parse a level name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "debug" | "trace" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO "),
            LogLevel::Warn => write!(f, "WARN "),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

struct FileSink {
    file: Option<File>,
    min_level: LogLevel,
}

impl FileSink {
    fn from_env() -> Self {
        let enabled = std::env::var("TOOLCHAT_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let min_level = std::env::var("TOOLCHAT_LOG_LEVEL")
            .ok()
            .and_then(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Debug);

        let file = if enabled {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file_path())
                .ok()
        } else {
            None
        };

        Self { file, min_level }
    }

    fn write(&mut self, level: LogLevel, source: &str, message: &str) {
        if level < self.min_level {
            return;
        }
        let Some(file) = self.file.as_mut() else {
            return;
        };

        let _ = writeln!(file, "[{}] [{}] {} {}", timestamp(), level, source, message);
        let _ = file.flush();
    }
}

/// Wall-clock time of day (UTC) with millisecond precision
fn timestamp() -> String {
    match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
        Ok(d) => {
            let secs = d.as_secs();
            format!(
                "{:02}:{:02}:{:02}.{:03}",
                (secs % 86400) / 3600,
                (secs % 3600) / 60,
                secs % 60,
                d.subsec_millis()
            )
        }
        Err(_) => "??:??:??.???".to_string(),
    }
}

static SINK: OnceLock<Mutex<FileSink>> = OnceLock::new();

fn sink() -> &'static Mutex<FileSink> {
    SINK.get_or_init(|| Mutex::new(FileSink::from_env()))
}

/// Append a line at the given level
pub fn log(level: LogLevel, source: &str, message: &str) {
    if let Ok(mut sink) = sink().lock() {
        sink.write(level, source, message);
    }
}

pub fn debug(source: &str, message: &str) {
    log(LogLevel::Debug, source, message);
}

pub fn info(source: &str, message: &str) {
    log(LogLevel::Info, source, message);
}

pub fn warn(source: &str, message: &str) {
    log(LogLevel::Warn, source, message);
}

pub fn error(source: &str, message: &str) {
    log(LogLevel::Error, source, message);
}

/// Get the path to the log file
pub fn log_file_path() -> PathBuf {
    match std::env::var_os("TOOLCHAT_LOG_FILE") {
        Some(path) => PathBuf::from(path),
        None => std::env::temp_dir().join("toolchat-debug.log"),
    }
}
