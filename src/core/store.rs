//! Append-only writer for `;`-delimited log files.
//!
//! Every call opens, writes one encoded row with a single `write_all`, stamps the
//! modification time and closes. No handle outlives a call, so an interruption
//! between two appends leaves a readable file.

use crate::errors::{AppError, AppResult};
use crate::models::{HEADER, Row};
use chrono::DateTime;
use chrono_tz::Tz;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::SystemTime;

const DELIMITER: u8 = b';';

/// Write the header iff the file does not exist yet. Returns `true` when the
/// file was created by this call.
pub fn ensure_header(path: &Path, at: DateTime<Tz>) -> AppResult<bool> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    file.write_all(&encode(&HEADER)?)?;
    file.set_modified(SystemTime::from(at))?;
    Ok(true)
}

/// Append one row to `path`, creating the file if needed. The modification
/// time only moves forward: a late row never dates the file back.
pub fn append<R: Row>(path: &Path, row: &R) -> AppResult<()> {
    let line = encode(&row.fields())?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let previous = file.metadata()?.modified()?;
    file.write_all(&line)?;
    file.set_modified(previous.max(SystemTime::from(row.at())))?;
    Ok(())
}

/// Data rows of a log file, header excluded.
pub fn read_rows(path: &Path) -> AppResult<Vec<[String; 3]>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        out.push([
            rec.get(0).unwrap_or_default().to_string(),
            rec.get(1).unwrap_or_default().to_string(),
            rec.get(2).unwrap_or_default().to_string(),
        ]);
    }
    Ok(out)
}

/// Append already-encoded data rows in one write. Used when folding one log
/// file into another.
pub fn append_rows(path: &Path, rows: &[[String; 3]]) -> AppResult<()> {
    if rows.is_empty() {
        return Ok(());
    }
    let mut buf = Vec::new();
    for r in rows {
        buf.extend(encode(r)?);
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(&buf)?;
    Ok(())
}

/// Replace `target` with a file holding the header plus `rows`, going through
/// `scratch` so a reader never sees a half-written file. The previous
/// modification time is preserved.
pub fn rewrite(target: &Path, scratch: &Path, rows: &[[String; 3]]) -> AppResult<()> {
    let modified = fs::metadata(target)?.modified()?;

    let mut buf = encode(&HEADER)?;
    for r in rows {
        buf.extend(encode(r)?);
    }

    {
        let mut file = File::create(scratch)?;
        file.write_all(&buf)?;
        file.sync_all()?;
        file.set_modified(modified)?;
    }
    fs::rename(scratch, target)?;
    Ok(())
}

fn encode<S: AsRef<[u8]>>(fields: &[S]) -> AppResult<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .terminator(csv::Terminator::Any(b'\n'))
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(fields)?;
    wtr.into_inner()
        .map_err(|e| AppError::Io(io::Error::other(e.to_string())))
}
