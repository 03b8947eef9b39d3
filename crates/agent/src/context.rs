//! Agent context - dependency injection container

use std::sync::Arc;

use rendezvous_core::{SchedulingOrchestrator, SystemClock};
use rendezvous_domain::{RendezvousConfig, Result};
use rendezvous_infra::GoogleCalendarAdapter;
use tracing::info;

/// Wires the calendar adapter into the scheduling flows.
pub struct AgentContext {
    pub config: RendezvousConfig,
    pub calendar: Arc<GoogleCalendarAdapter>,
    pub orchestrator: SchedulingOrchestrator,
}

impl AgentContext {
    /// # Errors
    /// Returns `RendezvousError::Config` when the calendar cannot be reached
    /// with the configured credentials or timezone.
    pub fn new(config: RendezvousConfig) -> Result<Self> {
        let timezone = config.calendar.timezone()?;
        let calendar = Arc::new(GoogleCalendarAdapter::from_config(&config.calendar)?);

        let orchestrator = SchedulingOrchestrator::new(
            calendar.clone(),
            calendar.clone(),
            Arc::new(SystemClock::new(timezone)),
        )
        .with_settings(config.scheduling.clone());

        info!(
            calendar_id = calendar.calendar_id(),
            timezone = %timezone,
            appointment_minutes = config.scheduling.appointment_minutes,
            "Scheduling context ready"
        );

        Ok(Self { config, calendar, orchestrator })
    }
}
