//! Google Calendar adapter
//!
//! Implements the appointment repository and free/busy ports over the
//! Calendar v3 REST API. Every call is a single request (two for `update`,
//! which re-reads the event first); backend faults leave this module as
//! domain errors.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use rendezvous_core::{AppointmentRepository, FreeBusyProvider};
use rendezvous_domain::constants::{GOOGLE_CALENDAR_API_BASE, UNTITLED_APPOINTMENT_TITLE};
use rendezvous_domain::{
    Appointment, AppointmentStatus, BusyBlock, CalendarConfig, NewAppointment, RendezvousError,
    Result, TimeInterval,
};
use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::oauth::{AccessTokenProvider, ServiceAccountTokenProvider, StaticTokenProvider};
use super::types::{
    EventDateTime, FreeBusyItem, FreeBusyRequest, FreeBusyResponse, GoogleAttendee, GoogleEvent,
    GoogleEventsPage,
};
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Calendar v3 client bound to one calendar and the clinic timezone.
pub struct GoogleCalendarAdapter {
    http: HttpClient,
    tokens: Arc<dyn AccessTokenProvider>,
    base_url: String,
    calendar_id: String,
    timezone: Tz,
}

impl GoogleCalendarAdapter {
    pub fn new(
        http: HttpClient,
        tokens: Arc<dyn AccessTokenProvider>,
        calendar_id: impl Into<String>,
        timezone: Tz,
    ) -> Self {
        Self {
            http,
            tokens,
            base_url: GOOGLE_CALENDAR_API_BASE.to_string(),
            calendar_id: calendar_id.into(),
            timezone,
        }
    }

    /// Point the adapter at another API root (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the adapter from configuration, read once at startup.
    ///
    /// A pre-issued access token takes precedence over the service-account
    /// key.
    ///
    /// # Errors
    /// Returns `RendezvousError::Config` if the timezone is unknown, no
    /// credentials are configured, or the key file is unusable.
    pub fn from_config(config: &CalendarConfig) -> Result<Self> {
        let timezone = config.timezone()?;
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let tokens: Arc<dyn AccessTokenProvider> =
            match (&config.access_token, &config.credentials_path) {
                (Some(token), _) => Arc::new(StaticTokenProvider::new(token.clone())),
                (None, Some(path)) => {
                    let provider =
                        ServiceAccountTokenProvider::from_file(path.clone(), http.clone())?;
                    info!(
                        client_email = provider.client_email(),
                        calendar_id = %config.calendar_id,
                        "Using service account credentials"
                    );
                    Arc::new(provider)
                }
                (None, None) => {
                    return Err(RendezvousError::Config(
                        "no calendar credentials configured (set GOOGLE_SERVICE_ACCOUNT_FILE)"
                            .into(),
                    ));
                }
            };

        Ok(Self::new(http, tokens, config.calendar_id.clone(), timezone)
            .with_base_url(config.api_base_url.clone()))
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.base_url, urlencoding::encode(&self.calendar_id))
    }

    fn event_url(&self, id: &str) -> String {
        format!("{}/{}", self.events_url(), urlencoding::encode(id))
    }

    async fn authorized(&self, method: Method, url: &str) -> Result<RequestBuilder> {
        let token = self.tokens.access_token().await?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    fn event_time(&self, instant: DateTime<Tz>) -> EventDateTime {
        EventDateTime {
            date_time: Some(instant.to_rfc3339()),
            date: None,
            time_zone: Some(self.timezone.name().to_string()),
        }
    }

    fn parse_instant(&self, raw: &str) -> Result<DateTime<Tz>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|instant| instant.with_timezone(&self.timezone))
            .map_err(|e| RendezvousError::Transient(format!("malformed timestamp '{raw}': {e}")))
    }

    fn to_appointment(&self, event: GoogleEvent) -> Result<Appointment> {
        let id = event
            .id
            .ok_or_else(|| RendezvousError::Transient("calendar event without id".into()))?;

        let start = event.start.and_then(|t| t.date_time).ok_or_else(|| {
            RendezvousError::Transient(format!("event {id} has no start time of day"))
        })?;
        let end = event.end.and_then(|t| t.date_time).ok_or_else(|| {
            RendezvousError::Transient(format!("event {id} has no end time of day"))
        })?;
        let interval = TimeInterval::new(self.parse_instant(&start)?, self.parse_instant(&end)?)
            .map_err(|e| RendezvousError::Transient(format!("event {id}: {e}")))?;

        // Google also reports "tentative", which still holds the slot
        let status = match event.status.as_deref().map(str::parse::<AppointmentStatus>) {
            Some(Ok(AppointmentStatus::Cancelled)) => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Confirmed,
        };

        Ok(Appointment {
            id,
            title: event
                .summary
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNTITLED_APPOINTMENT_TITLE.to_string()),
            interval,
            description: event.description.unwrap_or_default(),
            status,
            html_link: event.html_link,
        })
    }
}

impl std::fmt::Debug for GoogleCalendarAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCalendarAdapter")
            .field("base_url", &self.base_url)
            .field("calendar_id", &self.calendar_id)
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AppointmentRepository for GoogleCalendarAdapter {
    async fn create(&self, appointment: NewAppointment) -> Result<Appointment> {
        let body = GoogleEvent {
            summary: Some(appointment.title),
            description: Some(appointment.description),
            start: Some(self.event_time(appointment.interval.start())),
            end: Some(self.event_time(appointment.interval.end())),
            attendees: appointment
                .attendee_email
                .map(|email| vec![GoogleAttendee { email }]),
            ..GoogleEvent::default()
        };

        let request = self.authorized(Method::POST, &self.events_url()).await?.json(&body);
        let response = self.http.send_checked(request).await?;
        let event: GoogleEvent = response.json().await.map_err(InfraError::from)?;
        let created = self.to_appointment(event)?;

        info!(
            calendar_id = %self.calendar_id,
            event_id = %created.id,
            start = %created.start(),
            "Calendar event created"
        );
        Ok(created)
    }

    async fn list(&self, window: &TimeInterval, max_results: usize) -> Result<Vec<Appointment>> {
        let query = [
            ("timeMin", window.start().to_rfc3339()),
            ("timeMax", window.end().to_rfc3339()),
            ("maxResults", max_results.to_string()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("timeZone", self.timezone.name().to_string()),
        ];

        let request = self.authorized(Method::GET, &self.events_url()).await?.query(&query);
        let response = self.http.send_checked(request).await?;
        let page: GoogleEventsPage = response.json().await.map_err(InfraError::from)?;

        let mut appointments: Vec<Appointment> = page
            .items
            .into_iter()
            .filter_map(|event| {
                let id = event.id.clone();
                match self.to_appointment(event) {
                    Ok(appointment) => Some(appointment),
                    Err(err) => {
                        warn!(event_id = ?id, error = %err, "Skipping unusable calendar event");
                        None
                    }
                }
            })
            .collect();
        // timeMin matches on event end, so in-progress events come back too
        appointments.retain(|appointment| {
            appointment.start() >= window.start() && appointment.start() < window.end()
        });
        appointments.sort_by_key(Appointment::start);
        appointments.truncate(max_results);

        debug!(
            calendar_id = %self.calendar_id,
            count = appointments.len(),
            more = page.next_page_token.is_some(),
            "Listed calendar events"
        );
        Ok(appointments)
    }

    async fn update(&self, id: &str, interval: &TimeInterval) -> Result<Appointment> {
        let url = self.event_url(id);

        let current = self.http.send_checked(self.authorized(Method::GET, &url).await?).await?;
        let mut event: Value = current.json().await.map_err(InfraError::from)?;
        let Some(fields) = event.as_object_mut() else {
            return Err(RendezvousError::Transient(format!("event {id} is not a JSON object")));
        };
        fields.insert(
            "start".into(),
            serde_json::to_value(self.event_time(interval.start())).map_err(InfraError::from)?,
        );
        fields.insert(
            "end".into(),
            serde_json::to_value(self.event_time(interval.end())).map_err(InfraError::from)?,
        );

        let request = self.authorized(Method::PUT, &url).await?.json(&event);
        let response = self.http.send_checked(request).await?;
        let updated: GoogleEvent = response.json().await.map_err(InfraError::from)?;

        let mut appointment = self.to_appointment(updated)?;
        appointment.status = AppointmentStatus::Rescheduled;

        info!(
            calendar_id = %self.calendar_id,
            event_id = %appointment.id,
            start = %appointment.start(),
            "Calendar event rescheduled"
        );
        Ok(appointment)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let request = self.authorized(Method::DELETE, &self.event_url(id)).await?;
        self.http.send_checked(request).await?;

        info!(calendar_id = %self.calendar_id, event_id = %id, "Calendar event deleted");
        Ok(())
    }
}

#[async_trait]
impl FreeBusyProvider for GoogleCalendarAdapter {
    async fn busy_blocks(&self, interval: &TimeInterval) -> Result<Vec<BusyBlock>> {
        let body = FreeBusyRequest {
            time_min: interval.start().to_rfc3339(),
            time_max: interval.end().to_rfc3339(),
            time_zone: self.timezone.name().to_string(),
            items: vec![FreeBusyItem { id: self.calendar_id.clone() }],
        };

        let url = format!("{}/freeBusy", self.base_url);
        let request = self.authorized(Method::POST, &url).await?.json(&body);
        let response = self.http.send_checked(request).await?;
        let mut freebusy: FreeBusyResponse = response.json().await.map_err(InfraError::from)?;

        let calendar = freebusy.calendars.remove(&self.calendar_id).ok_or_else(|| {
            RendezvousError::Transient(format!(
                "free/busy response has no entry for calendar {}",
                self.calendar_id
            ))
        })?;

        if let Some(error) = calendar.errors.first() {
            return Err(RendezvousError::Transient(format!(
                "free/busy unavailable for calendar {}: {} ({})",
                self.calendar_id, error.reason, error.domain
            )));
        }

        calendar
            .busy
            .iter()
            .map(|period| -> Result<BusyBlock> {
                Ok(BusyBlock {
                    start: self.parse_instant(&period.start)?,
                    end: self.parse_instant(&period.end)?,
                })
            })
            .collect()
    }
}
