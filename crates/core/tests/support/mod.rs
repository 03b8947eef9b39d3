//! Shared test helpers for `rendezvous-core` integration tests.
//!
//! The in-memory calendar stands in for the backend behind both calendar
//! ports and records every call, so flow tests can assert on what was (and
//! was not) sent to the backend.

pub mod calendar;

use chrono::{DateTime, TimeZone};
use chrono_tz::Europe::Paris;
use chrono_tz::Tz;

/// Local time in the clinic timezone.
pub fn paris(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Tz> {
    Paris.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

/// Reference instant used across the flow tests: 2024-01-10 09:00.
pub fn reference_now() -> DateTime<Tz> {
    paris(2024, 1, 10, 9, 0)
}
