#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use appointment_cell::{
    Appointment, AppointmentStatus, AppointmentStore, CheckInError, CheckInReconciler,
    SettingsStore, TaskProperties, Visit, VisitQuery, VisitStore,
    SCHEDULER_MARKS_APPOINTMENT_CHECKED_IN, VISITS_FROM_PREVIOUS_DAYS,
};

/// Fixed invocation time used across the suite: Thursday 2024-03-14 10:30 UTC.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 14, 10, 30, 0).unwrap()
}

pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap()
}

pub fn scheduled_appointment(patient_id: Uuid, hour: u32) -> Appointment {
    appointment_with_status(patient_id, hour, AppointmentStatus::Scheduled)
}

pub fn appointment_with_status(patient_id: Uuid, hour: u32, status: AppointmentStatus) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        patient_id,
        status,
        start_date_time: at(14, hour, 0),
        end_date_time: at(14, hour, 30),
        status_changed_at: None,
    }
}

pub fn active_visit(patient_id: Uuid, start: DateTime<Utc>) -> Visit {
    Visit {
        id: Uuid::new_v4(),
        patient_id,
        start_datetime: start,
        stop_datetime: None,
        visit_type_id: None,
        location_id: None,
        voided: false,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub appointment_id: Uuid,
    pub status: AppointmentStatus,
    pub when: DateTime<Utc>,
}

// ==============================================================================
// IN-MEMORY STORES
// ==============================================================================

#[derive(Default)]
pub struct InMemorySettingsStore {
    settings: RwLock<HashMap<String, String>>,
    pub reads: AtomicUsize,
}

impl InMemorySettingsStore {
    pub fn with_flag(value: &str) -> Self {
        let mut settings = HashMap::new();
        settings.insert(SCHEDULER_MARKS_APPOINTMENT_CHECKED_IN.to_string(), value.to_string());
        Self {
            settings: RwLock::new(settings),
            ..Self::default()
        }
    }

    pub async fn set(&self, name: &str, value: &str) {
        self.settings.write().await.insert(name.to_string(), value.to_string());
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get_setting(&self, name: &str) -> Result<Option<String>, CheckInError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.settings.read().await.get(name).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<Vec<Appointment>>,
    history: RwLock<Vec<StatusChange>>,
    pub range_queries: AtomicUsize,
}

impl InMemoryAppointmentStore {
    pub fn with_appointments(appointments: Vec<Appointment>) -> Self {
        Self {
            appointments: RwLock::new(appointments),
            ..Self::default()
        }
    }

    pub async fn history(&self) -> Vec<StatusChange> {
        self.history.read().await.clone()
    }

    pub async fn status_of(&self, id: Uuid) -> Option<AppointmentStatus> {
        self.appointments
            .read()
            .await
            .iter()
            .find(|appointment| appointment.id == id)
            .map(|appointment| appointment.status)
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn get_appointments_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, CheckInError> {
        self.range_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .appointments
            .read()
            .await
            .iter()
            .filter(|appointment| appointment.intersects(start, end))
            .cloned()
            .collect())
    }

    async fn change_status(
        &self,
        appointment: &Appointment,
        status: AppointmentStatus,
        when: DateTime<Utc>,
    ) -> Result<(), CheckInError> {
        let mut appointments = self.appointments.write().await;
        let stored = appointments
            .iter_mut()
            .find(|stored| stored.id == appointment.id)
            .ok_or_else(|| CheckInError::StoreError(format!("Appointment {} not found", appointment.id)))?;

        stored.status = status;
        stored.status_changed_at = Some(when);
        self.history.write().await.push(StatusChange {
            appointment_id: appointment.id,
            status,
            when,
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryVisitStore {
    visits: RwLock<Vec<Visit>>,
    pub queries: RwLock<Vec<VisitQuery>>,
}

impl InMemoryVisitStore {
    pub fn with_visits(visits: Vec<Visit>) -> Self {
        Self {
            visits: RwLock::new(visits),
            ..Self::default()
        }
    }

    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }
}

#[async_trait]
impl VisitStore for InMemoryVisitStore {
    async fn get_visits(&self, query: &VisitQuery) -> Result<Vec<Visit>, CheckInError> {
        self.queries.write().await.push(query.clone());
        Ok(self
            .visits
            .read()
            .await
            .iter()
            .filter(|visit| query.matches(visit))
            .cloned()
            .collect())
    }
}

// ==============================================================================
// HARNESS
// ==============================================================================

pub struct TestSetup {
    pub settings: Arc<InMemorySettingsStore>,
    pub appointments: Arc<InMemoryAppointmentStore>,
    pub visits: Arc<InMemoryVisitStore>,
    pub reconciler: CheckInReconciler,
}

impl TestSetup {
    pub fn new(
        flag: Option<&str>,
        look_back: Option<&str>,
        appointments: Vec<Appointment>,
        visits: Vec<Visit>,
    ) -> Self {
        let settings = Arc::new(match flag {
            Some(value) => InMemorySettingsStore::with_flag(value),
            None => InMemorySettingsStore::default(),
        });
        let appointments = Arc::new(InMemoryAppointmentStore::with_appointments(appointments));
        let visits = Arc::new(InMemoryVisitStore::with_visits(visits));

        let properties = match look_back {
            Some(days) => TaskProperties::new().with_property(VISITS_FROM_PREVIOUS_DAYS, days),
            None => TaskProperties::new(),
        };

        let reconciler = CheckInReconciler::new(
            settings.clone(),
            appointments.clone(),
            visits.clone(),
            properties,
        );

        Self {
            settings,
            appointments,
            visits,
            reconciler,
        }
    }
}
