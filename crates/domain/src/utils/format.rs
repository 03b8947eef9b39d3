//! Spoken date/time formatting.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};

use crate::constants::SPOKEN_SLOT_FORMAT;

/// Format a slot start the way it is read back to callers.
///
/// ```
/// use chrono::TimeZone;
/// use chrono_tz::Europe::Paris;
/// use rendezvous_domain::format_slot;
///
/// let start = Paris.with_ymd_and_hms(2024, 1, 11, 14, 0, 0).unwrap();
/// assert_eq!(format_slot(&start), "11/01/2024 à 14h00");
/// ```
pub fn format_slot<Tz>(start: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    start.format(SPOKEN_SLOT_FORMAT).to_string()
}

/// Format a numbered list of slots: `1. 11/01/2024 à 14h00 ; 2. ...`.
pub fn format_numbered_slots<Tz>(starts: &[DateTime<Tz>]) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    starts
        .iter()
        .enumerate()
        .map(|(index, start)| format!("{}. {}", index + 1, format_slot(start)))
        .collect::<Vec<_>>()
        .join(" ; ")
}
