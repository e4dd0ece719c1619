//! Serialized access to the active log file.
//!
//! A rename racing an append could write a row into a file that was just
//! archived, so every rotation and every append runs under one lock.

use crate::core::rotation::{RotationReport, Rotator};
use crate::core::store;
use crate::errors::AppResult;
use crate::models::{Record, Row, RunMarker};
use crate::utils::date::date_key;
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct JournalState {
    /// Day of the last full reconcile.
    reconciled_for: Option<NaiveDate>,
    /// Latest timestamp appended through this journal.
    last_written: Option<DateTime<Tz>>,
}

#[derive(Debug)]
pub struct Journal {
    rotator: Rotator,
    state: Mutex<JournalState>,
}

impl Journal {
    pub fn new(rotator: Rotator) -> Self {
        Self {
            rotator,
            state: Mutex::new(JournalState::default()),
        }
    }

    pub fn active_path(&self) -> PathBuf {
        self.rotator.layout().active_path()
    }

    pub fn last_written(&self) -> Option<DateTime<Tz>> {
        self.lock().last_written
    }

    /// Full rotation pass. A `now` on an earlier day than the last pass never
    /// rotates backwards; it only makes sure the active file has its header.
    pub fn reconcile(&self, now: DateTime<Tz>) -> AppResult<RotationReport> {
        let mut state = self.lock();
        self.reconcile_locked(&mut state, now)
    }

    pub fn append(&self, record: &Record) -> AppResult<()> {
        self.write(record)
    }

    pub fn mark(&self, marker: &RunMarker) -> AppResult<()> {
        self.write(marker)
    }

    fn write<R: Row>(&self, row: &R) -> AppResult<()> {
        let mut state = self.lock();
        let now = row.at();

        // Same day as the last full pass (or a late row from the day before):
        // only the header can be missing.
        if state.reconciled_for.is_some_and(|d| d >= date_key(&now)) {
            store::ensure_header(&self.active_path(), now)?;
        } else {
            self.reconcile_locked(&mut state, now)?;
        }

        store::append(&self.active_path(), row)?;
        if state.last_written.is_none_or(|t| t < now) {
            state.last_written = Some(now);
        }
        Ok(())
    }

    fn reconcile_locked(&self, state: &mut JournalState, now: DateTime<Tz>) -> AppResult<RotationReport> {
        if state.reconciled_for.is_some_and(|d| d > date_key(&now)) {
            let header_created = store::ensure_header(&self.active_path(), now)?;
            return Ok(RotationReport {
                header_created,
                ..RotationReport::default()
            });
        }

        let report = self.rotator.reconcile(now)?;
        state.reconciled_for = if report.failed.is_empty() {
            Some(date_key(&now))
        } else {
            None
        };
        Ok(report)
    }

    fn lock(&self) -> MutexGuard<'_, JournalState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
