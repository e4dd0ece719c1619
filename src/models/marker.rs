use super::{Row, record::TIMESTAMP_FORMAT};
use chrono::DateTime;
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    RunStart,
    RunEnd,
}

impl MarkerKind {
    pub fn text(&self) -> &'static str {
        match self {
            MarkerKind::RunStart => "RUN START",
            MarkerKind::RunEnd => "RUN END",
        }
    }
}

/// Synthetic row delimiting one invocation. The topic column stays empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RunMarker {
    pub kind: MarkerKind,
    pub timestamp: DateTime<Tz>,
}

impl RunMarker {
    pub fn start(timestamp: DateTime<Tz>) -> Self {
        Self {
            kind: MarkerKind::RunStart,
            timestamp,
        }
    }

    pub fn end(timestamp: DateTime<Tz>) -> Self {
        Self {
            kind: MarkerKind::RunEnd,
            timestamp,
        }
    }
}

impl Row for RunMarker {
    fn at(&self) -> DateTime<Tz> {
        self.timestamp
    }

    fn fields(&self) -> [String; 3] {
        [
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            String::new(),
            self.kind.text().to_string(),
        ]
    }
}
