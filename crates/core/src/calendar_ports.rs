//! Calendar backend port interfaces
//!
//! Implementations translate every backend fault into a
//! [`RendezvousError`](rendezvous_domain::RendezvousError) variant. No call
//! is retried behind these traits: one invocation is one attempt.

use async_trait::async_trait;
use rendezvous_domain::{Appointment, BusyBlock, NewAppointment, Result, TimeInterval};

/// Create, read, update and delete appointments at the calendar backend.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Create an appointment.
    ///
    /// Fails with `SlotConflict`, `PermissionDenied` or `Transient`.
    async fn create(&self, appointment: NewAppointment) -> Result<Appointment>;

    /// Appointments starting within `window`, ascending by start, at most
    /// `max_results` of them.
    ///
    /// Fails with `PermissionDenied` or `Transient`.
    async fn list(&self, window: &TimeInterval, max_results: usize) -> Result<Vec<Appointment>>;

    /// Move an appointment to `interval`, based on the backend's current copy.
    ///
    /// Fails with `NotFound`, `SlotConflict`, `PermissionDenied` or
    /// `Transient`.
    async fn update(&self, id: &str, interval: &TimeInterval) -> Result<Appointment>;

    /// Delete an appointment.
    ///
    /// Fails with `NotFound` (including when it was already deleted),
    /// `PermissionDenied` or `Transient`.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// The backend's free/busy feed.
#[async_trait]
pub trait FreeBusyProvider: Send + Sync {
    /// Busy periods intersecting `interval`.
    async fn busy_blocks(&self, interval: &TimeInterval) -> Result<Vec<BusyBlock>>;
}
