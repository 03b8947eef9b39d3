use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use rendezvous_core::{AppointmentRepository, FreeBusyProvider};
use rendezvous_domain::{
    Appointment, AppointmentStatus, BusyBlock, NewAppointment, RendezvousError,
    Result as DomainResult, TimeInterval,
};

#[derive(Default)]
struct CalendarState {
    appointments: Vec<Appointment>,
    created: Vec<NewAppointment>,
    extra_busy: Vec<BusyBlock>,
    next_id: u32,
    create_calls: usize,
    list_calls: usize,
    update_calls: usize,
    delete_calls: usize,
    freebusy_calls: usize,
    fail_create: Option<RendezvousError>,
    fail_list: Option<RendezvousError>,
    fail_update: Option<RendezvousError>,
    fail_delete: Option<RendezvousError>,
    fail_freebusy: Option<RendezvousError>,
}

/// In-memory calendar implementing both calendar ports.
///
/// Stored appointments are reported busy by the free/busy feed, like the
/// real backend. Each operation can be made to fail with a chosen error.
#[derive(Default, Clone)]
pub struct InMemoryCalendar {
    state: Arc<Mutex<CalendarState>>,
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a confirmed appointment and return its id.
    pub fn seed(&self, start: DateTime<Tz>, minutes: i64) -> String {
        self.seed_with_status(start, minutes, AppointmentStatus::Confirmed)
    }

    pub fn seed_with_status(
        &self,
        start: DateTime<Tz>,
        minutes: i64,
        status: AppointmentStatus,
    ) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("seed-{}", state.next_id);
        state.appointments.push(Appointment {
            id: id.clone(),
            title: "Consultation".to_string(),
            interval: TimeInterval::starting_at(start, Duration::minutes(minutes)).unwrap(),
            description: String::new(),
            status,
            html_link: None,
        });
        id
    }

    /// Busy period that is not an appointment (e.g. a clinician's break).
    pub fn block(&self, start: DateTime<Tz>, end: DateTime<Tz>) {
        self.state.lock().unwrap().extra_busy.push(BusyBlock { start, end });
    }

    pub fn fail_create(&self, err: RendezvousError) {
        self.state.lock().unwrap().fail_create = Some(err);
    }

    pub fn fail_list(&self, err: RendezvousError) {
        self.state.lock().unwrap().fail_list = Some(err);
    }

    pub fn fail_update(&self, err: RendezvousError) {
        self.state.lock().unwrap().fail_update = Some(err);
    }

    pub fn fail_delete(&self, err: RendezvousError) {
        self.state.lock().unwrap().fail_delete = Some(err);
    }

    pub fn fail_freebusy(&self, err: RendezvousError) {
        self.state.lock().unwrap().fail_freebusy = Some(err);
    }

    pub fn appointments(&self) -> Vec<Appointment> {
        self.state.lock().unwrap().appointments.clone()
    }

    pub fn appointment(&self, id: &str) -> Option<Appointment> {
        self.appointments().into_iter().find(|a| a.id == id)
    }

    /// Requests received by `create`, including failed ones.
    pub fn created(&self) -> Vec<NewAppointment> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn update_calls(&self) -> usize {
        self.state.lock().unwrap().update_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.state.lock().unwrap().delete_calls
    }

    pub fn freebusy_calls(&self) -> usize {
        self.state.lock().unwrap().freebusy_calls
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryCalendar {
    async fn create(&self, appointment: NewAppointment) -> DomainResult<Appointment> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        state.created.push(appointment.clone());
        if let Some(err) = state.fail_create.clone() {
            return Err(err);
        }

        state.next_id += 1;
        let created = Appointment {
            id: format!("evt-{}", state.next_id),
            title: appointment.title,
            interval: appointment.interval,
            description: appointment.description,
            status: AppointmentStatus::Confirmed,
            html_link: None,
        };
        state.appointments.push(created.clone());
        Ok(created)
    }

    async fn list(
        &self,
        window: &TimeInterval,
        max_results: usize,
    ) -> DomainResult<Vec<Appointment>> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        if let Some(err) = state.fail_list.clone() {
            return Err(err);
        }

        let mut listed: Vec<Appointment> = state
            .appointments
            .iter()
            .filter(|a| a.start() >= window.start() && a.start() < window.end())
            .cloned()
            .collect();
        listed.sort_by_key(Appointment::start);
        listed.truncate(max_results);
        Ok(listed)
    }

    async fn update(&self, id: &str, interval: &TimeInterval) -> DomainResult<Appointment> {
        let mut state = self.state.lock().unwrap();
        state.update_calls += 1;
        if let Some(err) = state.fail_update.clone() {
            return Err(err);
        }

        let appointment = state
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| RendezvousError::NotFound(format!("appointment {id}")))?;
        appointment.interval = interval.clone();
        appointment.status = AppointmentStatus::Rescheduled;
        Ok(appointment.clone())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        state.delete_calls += 1;
        if let Some(err) = state.fail_delete.clone() {
            return Err(err);
        }

        let before = state.appointments.len();
        state.appointments.retain(|a| a.id != id);
        if state.appointments.len() == before {
            return Err(RendezvousError::NotFound(format!("appointment {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl FreeBusyProvider for InMemoryCalendar {
    async fn busy_blocks(&self, interval: &TimeInterval) -> DomainResult<Vec<BusyBlock>> {
        let mut state = self.state.lock().unwrap();
        state.freebusy_calls += 1;
        if let Some(err) = state.fail_freebusy.clone() {
            return Err(err);
        }

        let from_appointments = state
            .appointments
            .iter()
            .filter(|a| a.status != AppointmentStatus::Cancelled)
            .map(|a| BusyBlock { start: a.start(), end: a.end() });
        let blocks = from_appointments
            .chain(state.extra_busy.iter().cloned())
            .filter(|block| interval.overlaps(block.start, block.end))
            .collect();
        Ok(blocks)
    }
}
