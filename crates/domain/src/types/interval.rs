//! Half-open time interval in the clinic timezone.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::Serialize;

use crate::errors::{RendezvousError, Result};

/// A `[start, end)` interval. Construction guarantees `start < end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeInterval {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl TimeInterval {
    /// Build an interval, rejecting empty or inverted ranges.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self> {
        if start >= end {
            return Err(RendezvousError::InvalidInput(format!(
                "interval must end after it starts ({} >= {})",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    /// Build an interval of `duration` starting at `start`.
    pub fn starting_at(start: DateTime<Tz>, duration: Duration) -> Result<Self> {
        let end = start.checked_add_signed(duration).ok_or_else(|| {
            RendezvousError::InvalidInput(format!(
                "interval end overflows for start {}",
                start.to_rfc3339()
            ))
        })?;
        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True when the two intervals share at least one instant.
    ///
    /// Back-to-back intervals (one ends exactly when the other starts) do not
    /// overlap.
    pub fn overlaps(&self, other_start: DateTime<Tz>, other_end: DateTime<Tz>) -> bool {
        other_start < self.end && self.start < other_end
    }
}
