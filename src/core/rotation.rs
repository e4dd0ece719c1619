//! Day rotation and retention of the log directory.
//!
//! Cleanup is best effort: a file that cannot be renamed or removed is logged,
//! reported and left for the next reconcile to retry. Only failing to list the
//! directory or to create the active file aborts a pass.

use crate::core::store;
use crate::errors::AppResult;
use crate::models::{LogFileKind, LogLayout};
use crate::utils::date::{date_key, modified_date_key, retained_archive_dates};
use crate::utils::time::local_from_str;
use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How much of the retained archives survives a reconcile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionPolicy {
    /// Whole files: today plus the previous `retention_days - 1` archives.
    #[default]
    Daily,
    /// As `Daily`, then archived rows older than `(retention_days - 1) * 24h`
    /// are dropped.
    Rolling,
}

#[derive(Debug, Default)]
pub struct RotationReport {
    /// Archive the active file was moved to, if the day changed.
    pub archived: Option<PathBuf>,
    /// True when the archive already existed and the rows were appended to it.
    pub merged: bool,
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
    pub trimmed_rows: usize,
    pub header_created: bool,
}

impl RotationReport {
    pub fn is_noop(&self) -> bool {
        self.archived.is_none()
            && self.removed.is_empty()
            && self.failed.is_empty()
            && self.trimmed_rows == 0
            && !self.header_created
    }
}

#[derive(Debug, Clone)]
pub struct Rotator {
    layout: LogLayout,
    tz: Tz,
    retention_days: u32,
    policy: RetentionPolicy,
}

impl Rotator {
    pub fn new(layout: LogLayout, tz: Tz, retention_days: u32, policy: RetentionPolicy) -> Self {
        Self {
            layout,
            tz,
            retention_days: retention_days.max(1),
            policy,
        }
    }

    pub fn layout(&self) -> &LogLayout {
        &self.layout
    }

    /// Bring the directory in line with `now`: archive a stale active file,
    /// drop everything outside the whitelist, make sure today's file has its
    /// header.
    pub fn reconcile(&self, now: DateTime<Tz>) -> AppResult<RotationReport> {
        let today = date_key(&now);
        let mut report = RotationReport::default();

        fs::create_dir_all(self.layout.dir())?;

        self.archive_stale_active(today, &mut report);

        let keep = retained_archive_dates(today, self.retention_days);
        self.sweep(&keep, &mut report)?;

        if self.policy == RetentionPolicy::Rolling {
            let cutoff = now - Duration::hours(24 * i64::from(self.retention_days - 1));
            for date in &keep {
                self.trim_archive(*date, cutoff, &mut report);
            }
        }

        report.header_created = store::ensure_header(&self.layout.active_path(), now)?;
        Ok(report)
    }

    /// Move the active file out of the way when it belongs to another day. The
    /// archive is named after the file's own day, which is not necessarily
    /// yesterday.
    fn archive_stale_active(&self, today: NaiveDate, report: &mut RotationReport) {
        let active = self.layout.active_path();
        if !active.exists() {
            return;
        }

        let file_day = match modified_date_key(&active, self.tz) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Cannot read modification time of {}: {}", active.display(), e);
                report.failed.push((active, e.to_string()));
                return;
            }
        };
        if file_day == today {
            return;
        }

        let target = self.layout.archive_path(file_day);
        let result = if target.exists() {
            report.merged = true;
            merge_into(&active, &target)
        } else {
            fs::rename(&active, &target).map_err(Into::into)
        };

        match result {
            Ok(()) => {
                log::info!("Archived {} as {}", active.display(), target.display());
                report.archived = Some(target);
            }
            Err(e) => {
                log::warn!("Failed to archive {}: {}", active.display(), e);
                report.failed.push((active, e.to_string()));
            }
        }
    }

    fn sweep(&self, keep: &[NaiveDate], report: &mut RotationReport) -> AppResult<()> {
        for entry in fs::read_dir(self.layout.dir())? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };

            let stale = match self.layout.classify(name) {
                None | Some(LogFileKind::Active) => false,
                Some(LogFileKind::Archived(d)) => !keep.contains(&d),
                Some(LogFileKind::Malformed) => true,
            };
            if !stale {
                continue;
            }

            let path = entry.path();
            match fs::remove_file(&path) {
                Ok(()) => {
                    log::info!("Removed expired log {}", path.display());
                    report.removed.push(path);
                }
                Err(e) => {
                    log::warn!("Failed to remove {}: {}", path.display(), e);
                    report.failed.push((path, e.to_string()));
                }
            }
        }
        Ok(())
    }

    fn trim_archive(&self, date: NaiveDate, cutoff: DateTime<Tz>, report: &mut RotationReport) {
        let path = self.layout.archive_path(date);
        if !path.exists() {
            return;
        }

        let result = store::read_rows(&path).and_then(|rows| {
            let before = rows.len();
            let kept: Vec<_> = rows
                .into_iter()
                .filter(|r| local_from_str(self.tz, &r[0]).is_none_or(|t| t >= cutoff))
                .collect();
            let dropped = before - kept.len();
            if dropped > 0 {
                store::rewrite(&path, &self.layout.scratch_path(), &kept)?;
            }
            Ok(dropped)
        });

        match result {
            Ok(0) => {}
            Ok(n) => {
                log::info!("Trimmed {} rows older than {} from {}", n, cutoff, path.display());
                report.trimmed_rows += n;
            }
            Err(e) => {
                log::warn!("Failed to trim {}: {}", path.display(), e);
                report.failed.push((path, e.to_string()));
            }
        }
    }
}

/// Fold the data rows of `from` into the existing archive `to`, then remove `from`.
fn merge_into(from: &Path, to: &Path) -> AppResult<()> {
    let rows = store::read_rows(from)?;
    store::append_rows(to, &rows)?;
    fs::remove_file(from)?;
    Ok(())
}
