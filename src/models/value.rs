use serde::Serialize;

/// The two state values a topic may carry.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum BinaryValue {
    Off,
    On,
}

impl BinaryValue {
    /// Exact match on the wire literal; callers trim first.
    pub fn from_literal(s: &str) -> Option<Self> {
        match s {
            "0" => Some(Self::Off),
            "1" => Some(Self::On),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryValue::Off => "0",
            BinaryValue::On => "1",
        }
    }
}
