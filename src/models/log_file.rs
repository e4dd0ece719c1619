//! Naming of the day-bound log files inside the log directory.

use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Column header written once at the top of every log file.
pub const HEADER: [&str; 3] = ["time", "topic", "value"];

const EXTENSION: &str = "csv";

/// What a file name inside the log directory stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFileKind {
    Active,
    Archived(NaiveDate),
    /// Matches the convention but the embedded date is not a calendar day.
    Malformed,
}

/// Directory + stem pair from which every log file name derives.
///
/// - active file: `<stem>.csv`
/// - archive:     `<stem>_<YYYY-MM-DD>.csv`
#[derive(Debug, Clone)]
pub struct LogLayout {
    dir: PathBuf,
    stem: String,
    pattern: Regex,
}

impl LogLayout {
    pub fn new(dir: impl Into<PathBuf>, stem: &str) -> AppResult<Self> {
        if stem.is_empty() || stem.contains(['/', '\\']) {
            return Err(AppError::Config(format!("invalid file stem '{stem}'")));
        }

        let pattern = Regex::new(&format!(
            r"^{}(?:_(\d{{4}}-\d{{2}}-\d{{2}}))?\.{}$",
            regex::escape(stem),
            EXTENSION
        ))
        .map_err(|e| AppError::Config(format!("file stem '{stem}': {e}")))?;

        Ok(Self {
            dir: dir.into(),
            stem: stem.to_string(),
            pattern,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn active_name(&self) -> String {
        format!("{}.{}", self.stem, EXTENSION)
    }

    pub fn archive_name(&self, date: NaiveDate) -> String {
        format!("{}_{}.{}", self.stem, date.format("%Y-%m-%d"), EXTENSION)
    }

    pub fn active_path(&self) -> PathBuf {
        self.dir.join(self.active_name())
    }

    pub fn archive_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(self.archive_name(date))
    }

    /// Scratch file used while rewriting an archive. The leading dot keeps it
    /// outside the naming convention.
    pub fn scratch_path(&self) -> PathBuf {
        self.dir.join(format!(".{}.rewrite.tmp", self.stem))
    }

    /// Classify a bare file name. Names outside the convention yield `None`.
    pub fn classify(&self, file_name: &str) -> Option<LogFileKind> {
        let caps = self.pattern.captures(file_name)?;
        match caps.get(1) {
            None => Some(LogFileKind::Active),
            Some(m) => NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d")
                .map(LogFileKind::Archived)
                .ok()
                .or(Some(LogFileKind::Malformed)),
        }
    }
}
