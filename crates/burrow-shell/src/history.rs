//! Append-only command log collaborators.
//!
//! The shell core only ever calls `append` -- fire-and-forget, no read
//! path. Failures are logged and swallowed; a broken history file must
//! never take down a session.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// An append-only sink for executed command lines.
pub trait HistorySink {
    /// Record one raw input line. Must not fail outward.
    fn append(&self, line: &str);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHistory;

impl HistorySink for NullHistory {
    fn append(&self, _line: &str) {}
}

/// Appends one line per command to a file, creating parents as needed.
#[derive(Debug, Clone)]
pub struct FileHistory {
    path: PathBuf,
}

impl FileHistory {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn try_append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line.trim_end_matches('\n'))
    }
}

impl HistorySink for FileHistory {
    fn append(&self, line: &str) {
        if let Err(e) = self.try_append(line) {
            log::warn!("history append failed: {e}");
        }
    }
}
