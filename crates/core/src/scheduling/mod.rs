//! Scheduling flows: availability checks and the book / reschedule / cancel
//! orchestration on top of the calendar ports.

pub mod availability;
pub mod messages;
pub mod service;

pub use availability::AvailabilityOracle;
pub use messages::SchedulingReply;
pub use service::SchedulingOrchestrator;
