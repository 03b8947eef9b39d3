//! Configuration structures
//!
//! Read once at startup. The calendar adapter captures what it needs when it
//! is constructed and never looks at the configuration again.

use std::path::PathBuf;

use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::{
    CANCEL_CANDIDATES_SHOWN, CLINIC_TIMEZONE, DEFAULT_APPOINTMENT_MINUTES,
    DEFAULT_APPOINTMENT_TITLE, DEFAULT_LOOKAHEAD_DAYS, DEFAULT_REQUEST_TIMEOUT_SECS,
    GOOGLE_CALENDAR_API_BASE, MAX_APPOINTMENT_MINUTES, PRIMARY_CALENDAR_ID,
    UPCOMING_APPOINTMENTS_LIMIT,
};
use crate::errors::{RendezvousError, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendezvousConfig {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
}

/// Calendar backend settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Calendar to operate on; `"primary"` targets the account's main calendar.
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    /// Path to a service-account JSON key.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
    /// Pre-issued bearer token, used instead of the service account when set.
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            credentials_path: None,
            access_token: None,
            api_base_url: default_api_base_url(),
            timezone: default_timezone(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl CalendarConfig {
    /// Resolve the configured IANA timezone name.
    ///
    /// # Errors
    /// Returns `RendezvousError::Config` for unknown zone names.
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| RendezvousError::Config(format!("unknown timezone: {}", self.timezone)))
    }
}

/// Scheduling policy settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    #[serde(default = "default_appointment_minutes")]
    pub appointment_minutes: i64,
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u64,
    #[serde(default = "default_upcoming_limit")]
    pub upcoming_limit: usize,
    #[serde(default = "default_cancel_candidates")]
    pub cancel_candidates: usize,
    #[serde(default = "default_appointment_title")]
    pub appointment_title: String,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            appointment_minutes: default_appointment_minutes(),
            lookahead_days: default_lookahead_days(),
            upcoming_limit: default_upcoming_limit(),
            cancel_candidates: default_cancel_candidates(),
            appointment_title: default_appointment_title(),
        }
    }
}

impl SchedulingConfig {
    /// Length of a new booking.
    ///
    /// # Errors
    /// Returns `RendezvousError::Config` when `appointment_minutes` is outside
    /// `1..=MAX_APPOINTMENT_MINUTES`.
    pub fn appointment_duration(&self) -> Result<Duration> {
        if !(1..=MAX_APPOINTMENT_MINUTES).contains(&self.appointment_minutes) {
            return Err(RendezvousError::Config(format!(
                "appointment_minutes must be between 1 and {MAX_APPOINTMENT_MINUTES}, got {}",
                self.appointment_minutes
            )));
        }
        Duration::try_minutes(self.appointment_minutes).ok_or_else(|| {
            RendezvousError::Config(format!(
                "appointment_minutes out of range: {}",
                self.appointment_minutes
            ))
        })
    }

    /// Reject settings that would make every flow fail.
    ///
    /// # Errors
    /// Returns `RendezvousError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.appointment_duration()?;
        if self.lookahead_days == 0 {
            return Err(RendezvousError::Config("lookahead_days must be at least 1".into()));
        }
        if self.upcoming_limit == 0 || self.cancel_candidates == 0 {
            return Err(RendezvousError::Config(
                "upcoming_limit and cancel_candidates must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_calendar_id() -> String {
    PRIMARY_CALENDAR_ID.to_string()
}

fn default_api_base_url() -> String {
    GOOGLE_CALENDAR_API_BASE.to_string()
}

fn default_timezone() -> String {
    CLINIC_TIMEZONE.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_appointment_minutes() -> i64 {
    DEFAULT_APPOINTMENT_MINUTES
}

const fn default_lookahead_days() -> u64 {
    DEFAULT_LOOKAHEAD_DAYS
}

const fn default_upcoming_limit() -> usize {
    UPCOMING_APPOINTMENTS_LIMIT
}

const fn default_cancel_candidates() -> usize {
    CANCEL_CANDIDATES_SHOWN
}

fn default_appointment_title() -> String {
    DEFAULT_APPOINTMENT_TITLE.to_string()
}
