use super::{Row, value::BinaryValue};
use chrono::DateTime;
use chrono_tz::Tz;

/// Format of the `time` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One accepted observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub timestamp: DateTime<Tz>, // local wall clock of the configured zone
    pub source: String,          // originating topic
    pub value: BinaryValue,
}

impl Record {
    pub fn new(timestamp: DateTime<Tz>, source: impl Into<String>, value: BinaryValue) -> Self {
        Self {
            timestamp,
            source: source.into(),
            value,
        }
    }

    pub fn time_str(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

impl Row for Record {
    fn at(&self) -> DateTime<Tz> {
        self.timestamp
    }

    fn fields(&self) -> [String; 3] {
        [
            self.time_str(),
            self.source.clone(),
            self.value.as_str().to_string(),
        ]
    }
}
