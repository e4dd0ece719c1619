//! Date keys: which calendar day (in the configured zone) a file or instant belongs to.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

pub fn date_key(now: &DateTime<Tz>) -> NaiveDate {
    now.date_naive()
}

/// Day of the file's last modification, seen from `tz`.
pub fn modified_date_key(path: &Path, tz: Tz) -> io::Result<NaiveDate> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(system_time_in(modified, tz).date_naive())
}

pub fn system_time_in(t: SystemTime, tz: Tz) -> DateTime<Tz> {
    DateTime::<Utc>::from(t).with_timezone(&tz)
}

/// Archive dates kept alongside today's file: `today-1 ..= today-(days-1)`,
/// most recent first.
pub fn retained_archive_dates(today: NaiveDate, retention_days: u32) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut d = today;
    for _ in 1..retention_days {
        match d.pred_opt() {
            Some(prev) => {
                out.push(prev);
                d = prev;
            }
            None => break,
        }
    }
    out
}
