//! # Rendezvous Core
//!
//! Pure scheduling logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for the calendar backend and the clock
//! - The availability oracle
//! - The scheduling orchestrator behind `book`, `reschedule` and `cancel`
//!
//! ## Architecture Principles
//! - Only depends on `rendezvous-domain`
//! - No HTTP, filesystem or platform code
//! - All external dependencies via traits, injected at construction

pub mod calendar_ports;
pub mod clock;
pub mod scheduling;

// Re-export specific items to avoid ambiguity
pub use calendar_ports::{AppointmentRepository, FreeBusyProvider};
pub use clock::{Clock, FixedClock, SystemClock};
pub use scheduling::{AvailabilityOracle, SchedulingOrchestrator, SchedulingReply};
