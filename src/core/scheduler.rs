//! Run budget aligned to a fixed minute of every wall-clock hour.
//!
//! Invocations are started by an external scheduler once per hour. Each one
//! stops `safety_margin` seconds before the next alignment instant, so two
//! consecutive runs never overlap.

use chrono::{DateTime, Duration, Timelike};
use chrono_tz::Tz;

const SECS_PER_HOUR: u64 = 3600;

/// Seconds from `now` to the next alignment instant (minute `alignment_minute`
/// of the current hour, or of the next one when already past it). Zero when
/// `now` is exactly on the instant.
pub fn seconds_to_alignment(now: &DateTime<Tz>, alignment_minute: u32) -> u64 {
    let into_hour = u64::from(now.minute()) * 60 + u64::from(now.second());
    let target = u64::from(alignment_minute.min(59)) * 60;

    if target >= into_hour {
        target - into_hour
    } else {
        SECS_PER_HOUR - into_hour + target
    }
}

/// Run budget in seconds; zero means "do not start".
pub fn remaining_seconds(now: &DateTime<Tz>, alignment_minute: u32, safety_margin: u64) -> u64 {
    seconds_to_alignment(now, alignment_minute).saturating_sub(safety_margin)
}

/// Half-open interval `[start, deadline)` one invocation may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunWindow {
    pub start: DateTime<Tz>,
    pub deadline: DateTime<Tz>,
}

impl RunWindow {
    pub fn compute(now: DateTime<Tz>, alignment_minute: u32, safety_margin: u64) -> Self {
        let secs = remaining_seconds(&now, alignment_minute, safety_margin);
        Self {
            start: now,
            deadline: now + Duration::seconds(secs as i64),
        }
    }

    pub fn seconds(&self) -> u64 {
        (self.deadline - self.start).num_seconds().max(0) as u64
    }

    pub fn is_empty(&self) -> bool {
        self.deadline <= self.start
    }

    pub fn as_std(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.seconds())
    }
}
