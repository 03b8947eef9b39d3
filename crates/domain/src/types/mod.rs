//! Domain types and models

pub mod appointment;
pub mod availability;
pub mod interval;

pub use appointment::{Appointment, AppointmentStatus, NewAppointment};
pub use availability::{AvailabilityVerdict, BusyBlock, VerdictSource};
pub use interval::TimeInterval;
