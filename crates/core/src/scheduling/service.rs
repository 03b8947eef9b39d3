//! Scheduling orchestrator - core business logic for booking, rescheduling
//! and cancelling appointments.

use std::sync::Arc;

use chrono::{DateTime, Days};
use chrono_tz::Tz;
use rendezvous_domain::utils::contact::extract_email;
use rendezvous_domain::{
    Appointment, AppointmentStatus, NewAppointment, RendezvousError, Result, SchedulingConfig,
    TimeExpressionResolver, TimeInterval,
};
use tracing::{debug, error, info, warn};

use super::availability::AvailabilityOracle;
use super::messages::SchedulingReply;
use crate::calendar_ports::{AppointmentRepository, FreeBusyProvider};
use crate::clock::Clock;

/// Sequences parse, availability check, mutation and reply for one request.
///
/// Each entry point runs one sequential flow and always ends in a reply;
/// calendar faults are logged and turned into a sentence. Dropping the
/// returned future abandons the flow between backend calls.
pub struct SchedulingOrchestrator {
    repository: Arc<dyn AppointmentRepository>,
    oracle: AvailabilityOracle,
    clock: Arc<dyn Clock>,
    resolver: TimeExpressionResolver,
    settings: SchedulingConfig,
}

impl SchedulingOrchestrator {
    /// Orchestrator with the French resolver and default settings.
    pub fn new(
        repository: Arc<dyn AppointmentRepository>,
        free_busy: Arc<dyn FreeBusyProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            oracle: AvailabilityOracle::new(free_busy),
            clock,
            resolver: TimeExpressionResolver::french(),
            settings: SchedulingConfig::default(),
        }
    }

    /// Override durations, list sizes and the appointment title.
    pub fn with_settings(mut self, settings: SchedulingConfig) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the time expression resolver.
    pub fn with_resolver(mut self, resolver: TimeExpressionResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Book at the time named in `details` and return the caller's sentence.
    /// Never fails; every failure becomes a sentence.
    pub async fn book(&self, details: &str) -> String {
        self.book_reply(details).await.to_string()
    }

    /// Move the earliest upcoming appointment to the time named in
    /// `details` and return the caller's sentence.
    pub async fn reschedule(&self, details: &str) -> String {
        self.reschedule_reply(details).await.to_string()
    }

    /// Cancel the only upcoming appointment, or ask the caller to choose,
    /// and return the caller's sentence.
    pub async fn cancel(&self, details: &str) -> String {
        self.cancel_reply(details).await.to_string()
    }

    /// Book a new appointment at the time named in `details`.
    pub async fn book_reply(&self, details: &str) -> SchedulingReply {
        let now = self.clock.now();
        let Some(start) = self.resolve_start("book", details, &now) else {
            return SchedulingReply::Clarify;
        };

        let interval = match self
            .settings
            .appointment_duration()
            .and_then(|duration| TimeInterval::starting_at(start, duration))
        {
            Ok(interval) => interval,
            Err(err) => return Self::failed("book", &err, Some(start)),
        };

        if !self.oracle.is_free(&interval).await {
            info!(flow = "book", start = %start, "Requested slot is not available");
            return SchedulingReply::SlotUnavailable { slot: start };
        }

        let appointment = NewAppointment {
            title: self.settings.appointment_title.clone(),
            interval,
            description: details.to_string(),
            attendee_email: extract_email(details),
        };

        match self.repository.create(appointment).await {
            Ok(created) => {
                info!(
                    flow = "book",
                    appointment_id = %created.id,
                    start = %created.start(),
                    end = %created.end(),
                    "Appointment booked"
                );
                SchedulingReply::Booked { slot: created.start() }
            }
            Err(err) => Self::failed("book", &err, Some(start)),
        }
    }

    /// Move the next upcoming appointment to the time named in `details`.
    ///
    /// The target is the first listed upcoming appointment; no caller
    /// identity matching happens here.
    pub async fn reschedule_reply(&self, details: &str) -> SchedulingReply {
        let now = self.clock.now();
        let upcoming = match self.upcoming(&now).await {
            Ok(upcoming) => upcoming,
            Err(err) => return Self::failed("reschedule", &err, None),
        };

        let Some(target) = upcoming.first() else {
            info!(flow = "reschedule", "No upcoming appointment to reschedule");
            return SchedulingReply::NothingToReschedule;
        };

        let Some(start) = self.resolve_start("reschedule", details, &now) else {
            return SchedulingReply::Clarify;
        };

        let interval = match TimeInterval::starting_at(start, target.interval.duration()) {
            Ok(interval) => interval,
            Err(err) => return Self::failed("reschedule", &err, Some(start)),
        };

        if !self.oracle.is_free(&interval).await {
            info!(
                flow = "reschedule",
                appointment_id = %target.id,
                start = %start,
                "Requested slot is not available"
            );
            return SchedulingReply::SlotUnavailable { slot: start };
        }

        match self.repository.update(&target.id, &interval).await {
            Ok(updated) => {
                info!(
                    flow = "reschedule",
                    appointment_id = %updated.id,
                    from = %target.start(),
                    to = %updated.start(),
                    "Appointment rescheduled"
                );
                SchedulingReply::Rescheduled { slot: updated.start() }
            }
            Err(err) => Self::failed("reschedule", &err, Some(start)),
        }
    }

    /// Cancel the caller's upcoming appointment, or ask which one when there
    /// are several.
    pub async fn cancel_reply(&self, details: &str) -> SchedulingReply {
        let now = self.clock.now();
        debug!(flow = "cancel", details, "Cancellation requested");

        let upcoming = match self.upcoming(&now).await {
            Ok(upcoming) => upcoming,
            Err(err) => return Self::failed("cancel", &err, None),
        };

        match upcoming.as_slice() {
            [] => {
                info!(flow = "cancel", "No upcoming appointment to cancel");
                SchedulingReply::NothingToCancel
            }
            [only] => match self.repository.delete(&only.id).await {
                Ok(()) => {
                    info!(
                        flow = "cancel",
                        appointment_id = %only.id,
                        start = %only.start(),
                        "Appointment cancelled"
                    );
                    SchedulingReply::Cancelled { slot: only.start() }
                }
                Err(err) => Self::failed("cancel", &err, Some(only.start())),
            },
            several => {
                let candidates: Vec<DateTime<Tz>> = several
                    .iter()
                    .take(self.settings.cancel_candidates)
                    .map(Appointment::start)
                    .collect();
                info!(
                    flow = "cancel",
                    upcoming = several.len(),
                    shown = candidates.len(),
                    "Several upcoming appointments, asking caller to choose"
                );
                SchedulingReply::ChooseAppointment { candidates }
            }
        }
    }

    fn resolve_start(
        &self,
        flow: &'static str,
        details: &str,
        now: &DateTime<Tz>,
    ) -> Option<DateTime<Tz>> {
        match self.resolver.resolve(details, now) {
            Ok(start) => Some(start),
            Err(failure) => {
                warn!(flow, text = details, error = %failure, "Could not resolve requested time");
                None
            }
        }
    }

    /// Upcoming appointments from `now` over the lookahead window, earliest
    /// first, cancelled ones left out.
    async fn upcoming(&self, now: &DateTime<Tz>) -> Result<Vec<Appointment>> {
        let end = now.checked_add_days(Days::new(self.settings.lookahead_days)).ok_or_else(|| {
            RendezvousError::InvalidInput(format!(
                "lookahead of {} days overflows from {now}",
                self.settings.lookahead_days
            ))
        })?;
        let window = TimeInterval::new(*now, end)?;

        let mut appointments = self.repository.list(&window, self.settings.upcoming_limit).await?;
        appointments.retain(|appointment| appointment.status != AppointmentStatus::Cancelled);
        appointments.sort_by_key(Appointment::start);
        Ok(appointments)
    }

    fn failed(
        flow: &'static str,
        err: &RendezvousError,
        slot: Option<DateTime<Tz>>,
    ) -> SchedulingReply {
        let reply = SchedulingReply::for_failure(err, slot);
        match err {
            RendezvousError::SlotConflict(_) | RendezvousError::NotFound(_) => {
                warn!(flow, kind = err.kind(), error = %err, "Calendar rejected the request");
            }
            _ => {
                error!(flow, kind = err.kind(), error = %err, "Scheduling flow failed");
            }
        }
        reply
    }
}
