pub mod log_file;
pub mod marker;
pub mod record;
pub mod value;

use chrono::DateTime;
use chrono_tz::Tz;

/// Anything the record store can append as one `time;topic;value` line.
pub trait Row {
    /// Instant the row describes; also used to stamp the file's mtime.
    fn at(&self) -> DateTime<Tz>;

    fn fields(&self) -> [String; 3];
}

pub use log_file::{HEADER, LogFileKind, LogLayout};
pub use marker::{MarkerKind, RunMarker};
pub use record::Record;
pub use value::BinaryValue;
