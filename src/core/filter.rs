//! Admission of inbound messages into the log.

use crate::models::{BinaryValue, Record};
use crate::transport::InboundMessage;
use chrono::DateTime;
use chrono_tz::Tz;
use std::fmt;

/// Why a message was not persisted. Never an error, only a reason to drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Broker-side replay of the last known state, not a live transition.
    Retained,
    UnrecognizedValue(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Retained => write!(f, "retained message"),
            Rejection::UnrecognizedValue(v) => write!(f, "unrecognized payload '{v}'"),
        }
    }
}

/// Decode a payload into a state value. Invalid UTF-8 is replaced rather than
/// raised, so it simply fails to match.
pub fn parse_value(payload: &[u8]) -> Result<BinaryValue, Rejection> {
    let text = String::from_utf8_lossy(payload);
    let trimmed = text.trim();
    BinaryValue::from_literal(trimmed).ok_or_else(|| Rejection::UnrecognizedValue(trimmed.to_string()))
}

/// Turn a live, well-formed message into a record stamped `at`.
pub fn accept(message: &InboundMessage, at: DateTime<Tz>) -> Result<Record, Rejection> {
    if message.retained {
        return Err(Rejection::Retained);
    }
    let value = parse_value(&message.payload)?;
    Ok(Record::new(at, message.topic.clone(), value))
}
