//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Clinic calendar
pub const CLINIC_TIMEZONE: &str = "Europe/Paris";
pub const PRIMARY_CALENDAR_ID: &str = "primary";
pub const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const GOOGLE_CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Scheduling policy
pub const DEFAULT_APPOINTMENT_MINUTES: i64 = 30;
pub const MAX_APPOINTMENT_MINUTES: i64 = 24 * 60;
pub const DEFAULT_LOOKAHEAD_DAYS: u64 = 7;
pub const UPCOMING_APPOINTMENTS_LIMIT: usize = 5;
pub const CANCEL_CANDIDATES_SHOWN: usize = 3;
pub const DEFAULT_APPOINTMENT_TITLE: &str = "Rendez-vous";
pub const UNTITLED_APPOINTMENT_TITLE: &str = "Sans titre";

// Spoken date/time layout, e.g. "11/01/2024 à 14h30"
pub const SPOKEN_SLOT_FORMAT: &str = "%d/%m/%Y à %Hh%M";
