//! Free/busy results.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use super::interval::TimeInterval;

/// Busy period reported by the backend's free/busy feed.
///
/// Kept separate from [`TimeInterval`] because the backend may report
/// degenerate periods, which still count as busy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusyBlock {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// Where a verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    /// Computed from the backend's busy blocks.
    Calendar,
    /// The backend could not be queried; the slot is reported busy.
    CheckFailed,
}

/// Free/busy answer for one interval. Never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityVerdict {
    pub interval: TimeInterval,
    pub is_free: bool,
    pub source: VerdictSource,
}

impl AvailabilityVerdict {
    pub fn from_busy_blocks(interval: TimeInterval, blocks: &[BusyBlock]) -> Self {
        let is_free = !blocks.iter().any(|block| {
            interval.overlaps(block.start, block.end)
                || (block.start == block.end
                    && block.start >= interval.start()
                    && block.start < interval.end())
        });
        Self { interval, is_free, source: VerdictSource::Calendar }
    }

    /// Fail-closed verdict used when the backend could not answer.
    pub fn unknown(interval: TimeInterval) -> Self {
        Self { interval, is_free: false, source: VerdictSource::CheckFailed }
    }
}
