//! Request log sinks.
//!
//! The request log is the only record a request leaves behind. Sinks are
//! shared by every in-flight request and serialize their writes so lines
//! never interleave.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};
use log::Level;

use crate::error_handling::InitializationError;

/// Destination for request log lines.
pub trait LogSink: Send + Sync {
    /// Writes one line at `level`.
    fn write(&self, level: Level, message: &str);
}

/// Formats a line as `<utc-timestamp> [LEVEL] <message>`.
pub fn format_line(at: DateTime<Utc>, level: Level, message: &str) -> String {
    format!(
        "{} [{}] {}",
        at.to_rfc3339_opts(SecondsFormat::Micros, false),
        level_tag(level),
        message
    )
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

/// Appends lines to a file and mirrors them to the process logger.
pub struct FileLogSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileLogSink {
    /// Opens `path` for appending, creating it and its parent directories.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::LogFileError` if the directory or file
    /// cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InitializationError> {
        let path = path.as_ref().to_path_buf();
        let to_error = |source| InitializationError::LogFileError {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(to_error)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(to_error)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileLogSink {
    fn write(&self, level: Level, message: &str) {
        log::log!(level, "{message}");
        let line = format_line(Utc::now(), level, message);
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        // Write failures are reported, never propagated.
        if let Err(e) = writeln!(file, "{line}") {
            log::error!("Failed to write request log {}: {e}", self.path.display());
        }
    }
}

/// Keeps lines in memory; used by tests and embedders that ship logs elsewhere.
#[derive(Default)]
pub struct MemoryLogSink {
    lines: Mutex<Vec<String>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LogSink for MemoryLogSink {
    fn write(&self, level: Level, message: &str) {
        let line = format_line(Utc::now(), level, message);
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }
}
