//! Appointment records as held by the calendar backend.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::interval::TimeInterval;
use crate::impl_status_conversions;

/// Lifecycle state of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Confirmed,
    Rescheduled,
    Cancelled,
}

impl_status_conversions!(AppointmentStatus {
    Confirmed => "confirmed",
    Rescheduled => "rescheduled",
    Cancelled => "cancelled",
});

/// Appointment owned by the calendar backend.
///
/// Only ever held for the duration of one request; the backend stays the
/// single source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Appointment {
    /// Opaque identifier assigned by the backend.
    pub id: String,
    pub title: String,
    pub interval: TimeInterval,
    pub description: String,
    pub status: AppointmentStatus,
    /// Link to the event in the backend's web UI, when provided.
    pub html_link: Option<String>,
}

impl Appointment {
    pub fn start(&self) -> DateTime<Tz> {
        self.interval.start()
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.interval.end()
    }
}

/// Request to create an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAppointment {
    pub title: String,
    pub interval: TimeInterval,
    pub description: String,
    pub attendee_email: Option<String>,
}
