//! Append-only, per-day, per-category log files.
//!
//! All categories share one mutex so two entries can never interleave in a
//! file. Write failures are never returned to the caller; they are reported
//! through `tracing` after the mutex is released, which lets the Debug
//! category itself be fed by a `tracing-subscriber` layer (see
//! [`LogWriter::debug_writer`]) without risking a self-deadlock.

pub mod format;

pub use format::{format_duration, format_record};

use crate::error::Result;
use crate::store::ActivityRecord;
use chrono::{DateTime, Local, NaiveDate};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing_subscriber::fmt::MakeWriter;

/// Log file categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    System,
    Applications,
    Browser,
    Debug,
}

impl LogCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "System",
            Self::Applications => "Applications",
            Self::Browser => "Browser",
            Self::Debug => "Debug",
        }
    }

    /// `{yyyy-MM-dd}_{category}.log`
    pub fn file_name(self, date: NaiveDate) -> String {
        format!("{}_{}.log", date.format("%Y-%m-%d"), self.as_str())
    }
}

/// Serialised writer for the log directory.
#[derive(Debug)]
pub struct LogWriter {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl LogWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, category: LogCategory, date: NaiveDate) -> PathBuf {
        self.dir.join(category.file_name(date))
    }

    /// Creates the log directory if it is missing.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Appends an already formatted entry to today's file of `category`.
    ///
    /// Never fails outward.
    pub fn write(&self, category: LogCategory, entry: &str) {
        self.write_at(category, entry, Local::now());
    }

    /// Formats and appends an activity record.
    pub fn record(&self, record: &ActivityRecord) {
        let now = Local::now();
        let (category, entry) = format_record(record, now);
        self.write_at(category, &entry, now);
    }

    pub fn record_all(&self, records: &[ActivityRecord]) {
        for record in records {
            self.record(record);
        }
    }

    fn write_at(&self, category: LogCategory, entry: &str, now: DateTime<Local>) {
        // The guard is gone by the time the failure is reported.
        if let Err(e) = self.append(category, entry.as_bytes(), now) {
            tracing::warn!(
                category = category.as_str(),
                dir = %self.dir.display(),
                error = %e,
                "Failed to write log entry"
            );
        }
    }

    fn append(&self, category: LogCategory, bytes: &[u8], now: DateTime<Local>) -> io::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(category, now.date_naive());
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(bytes)
    }

    /// A `MakeWriter` that appends formatted `tracing` output to the
    /// Debug category file.
    pub fn debug_writer(self: &Arc<Self>) -> DebugLog {
        DebugLog(Arc::clone(self))
    }
}

/// `tracing-subscriber` sink for the Debug category.
#[derive(Debug, Clone)]
pub struct DebugLog(Arc<LogWriter>);

impl<'a> MakeWriter<'a> for DebugLog {
    type Writer = DebugLine;

    fn make_writer(&'a self) -> Self::Writer {
        DebugLine(Arc::clone(&self.0))
    }
}

/// One formatted event on its way to the Debug file.
#[derive(Debug)]
pub struct DebugLine(Arc<LogWriter>);

impl Write for DebugLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.append(LogCategory::Debug, buf, Local::now())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
