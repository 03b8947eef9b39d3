//! Live connectivity check against the configured calendar.
//!
//! Read-only by default: lists upcoming appointments and probes one slot.
//! With `--write` it also creates a throwaway event, moves it and deletes it.

use anyhow::{Context, Result};
use chrono::{DateTime, Days, Duration};
use chrono_tz::Tz;
use rendezvous_core::{AppointmentRepository, AvailabilityOracle, Clock, SystemClock};
use rendezvous_domain::{format_slot, NewAppointment, TimeExpressionResolver, TimeInterval};
use tracing::{info, warn};

use crate::context::AgentContext;

const PROBE_TITLE: &str = "Test agent vocal";
const SAMPLE_PHRASES: [&str; 4] =
    ["demain à 14h30", "aujourd'hui à 18h30", "15/01/2024 à 10h", "lundi prochain à 9h"];

/// Run the check. Fails on the first calendar error.
pub async fn run(ctx: &AgentContext, write: bool) -> Result<()> {
    let timezone = ctx.config.calendar.timezone()?;
    let now = SystemClock::new(timezone).now();

    list_upcoming(ctx, now).await?;
    probe_availability(ctx, now).await?;
    if write {
        round_trip_event(ctx, now).await?;
    }
    sample_parses(now);

    info!("Calendar check passed");
    Ok(())
}

async fn list_upcoming(ctx: &AgentContext, now: DateTime<Tz>) -> Result<()> {
    let end = now
        .checked_add_days(Days::new(ctx.config.scheduling.lookahead_days))
        .context("lookahead window overflows")?;
    let window = TimeInterval::new(now, end)?;

    let appointments = ctx
        .calendar
        .list(&window, ctx.config.scheduling.upcoming_limit)
        .await
        .context("listing upcoming appointments")?;

    info!(count = appointments.len(), "Upcoming appointments listed");
    for appointment in appointments.iter().take(3) {
        info!(title = %appointment.title, start = %format_slot(&appointment.start()), "Upcoming");
    }
    Ok(())
}

async fn probe_availability(ctx: &AgentContext, now: DateTime<Tz>) -> Result<()> {
    let probe = TimeInterval::starting_at(
        now + Duration::hours(2),
        ctx.config.scheduling.appointment_duration()?,
    )?;

    let verdict = AvailabilityOracle::new(ctx.calendar.clone()).check(&probe).await;
    if verdict.source == rendezvous_domain::VerdictSource::CheckFailed {
        anyhow::bail!("availability check failed for {}", format_slot(&probe.start()));
    }

    info!(slot = %format_slot(&probe.start()), free = verdict.is_free, "Availability probed");
    Ok(())
}

async fn round_trip_event(ctx: &AgentContext, now: DateTime<Tz>) -> Result<()> {
    let duration = ctx.config.scheduling.appointment_duration()?;
    let interval = TimeInterval::starting_at(now + Duration::hours(1), duration)?;

    let created = ctx
        .calendar
        .create(NewAppointment {
            title: PROBE_TITLE.to_string(),
            interval,
            description: "Événement de test créé automatiquement".to_string(),
            attendee_email: None,
        })
        .await
        .context("creating test event")?;
    info!(event_id = %created.id, link = ?created.html_link, "Test event created");

    let moved = TimeInterval::starting_at(created.start() + Duration::minutes(30), duration)?;
    let outcome = ctx.calendar.update(&created.id, &moved).await;

    // The event is removed even if the move failed.
    let deleted = ctx.calendar.delete(&created.id).await;

    let updated = outcome.context("moving test event")?;
    info!(slot = %format_slot(&updated.start()), "Test event moved");
    deleted.context("deleting test event")?;
    info!(event_id = %created.id, "Test event deleted");
    Ok(())
}

fn sample_parses(now: DateTime<Tz>) {
    let resolver = TimeExpressionResolver::french();
    for phrase in SAMPLE_PHRASES {
        match resolver.resolve(phrase, &now) {
            Ok(slot) => info!(phrase, slot = %format_slot(&slot), "Recognized"),
            Err(failure) => warn!(phrase, reason = %failure, "Not recognized"),
        }
    }
}
