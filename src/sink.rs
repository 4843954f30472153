//! Best-effort log sinks.
//!
//! Writing a log line must never fail the launcher or interrupt stream
//! draining, so `LogSink::append` has no error channel at all. Failures are
//! reported at `debug` level and dropped. Nothing is retried.

use chrono::{SecondsFormat, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Destination for forwarded bytes. Appends cannot fail the caller.
pub trait LogSink {
    fn append(&self, bytes: &[u8]);
}

/// Append-only file, created (with its parent directory) on first write.
///
/// The file is reopened for every append so a log rotated or deleted by
/// something else is simply recreated.
#[derive(Debug, Clone)]
pub struct AppendFile {
    path: PathBuf,
}

impl AppendFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn try_append(&self, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(bytes)
    }
}

impl LogSink for AppendFile {
    fn append(&self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        if let Err(e) = self.try_append(bytes) {
            tracing::debug!(path = %self.path.display(), error = %e, "log append dropped");
        }
    }
}

/// Launcher event log: one `[timestamp] message` line per event.
#[derive(Debug, Clone)]
pub struct LaunchLog {
    file: AppendFile,
}

impl LaunchLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AppendFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Record an event, timestamped in UTC with millisecond precision.
    pub fn line(&self, msg: &str) {
        tracing::info!("{msg}");
        self.file.append(format_line(&timestamp(), msg).as_bytes());
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn format_line(timestamp: &str, msg: &str) -> String {
    format!("[{timestamp}] {msg}\n")
}
