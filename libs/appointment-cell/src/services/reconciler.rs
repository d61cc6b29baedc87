// libs/appointment-cell/src/services/reconciler.rs
use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::CheckInError;
use crate::models::{Appointment, AppointmentStatus, ReconcileOutcome, TaskProperties, Visit, VisitQuery};
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::store::{AppointmentStore, SettingsStore, VisitStore};

pub const SCHEDULER_MARKS_APPOINTMENT_CHECKED_IN: &str = "SchedulerMarksAppointmentCheckedIn";
pub const VISITS_FROM_PREVIOUS_DAYS: &str = "PreviousDaysToConsiderVisitsFrom";

/// Marks today's scheduled appointments as checked in once the patient has
/// an active visit. Runs one pass per `reconcile` call; the host decides the
/// cadence and must not overlap calls.
pub struct CheckInReconciler {
    settings: Arc<dyn SettingsStore>,
    appointments: Arc<dyn AppointmentStore>,
    visits: Arc<dyn VisitStore>,
    task_properties: TaskProperties,
    lifecycle: AppointmentLifecycleService,
}

impl CheckInReconciler {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        appointments: Arc<dyn AppointmentStore>,
        visits: Arc<dyn VisitStore>,
        task_properties: TaskProperties,
    ) -> Self {
        Self {
            settings,
            appointments,
            visits,
            task_properties,
            lifecycle: AppointmentLifecycleService::utc(),
        }
    }

    pub fn with_lifecycle(mut self, lifecycle: AppointmentLifecycleService) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    #[instrument(skip(self))]
    pub async fn reconcile(&self, now: DateTime<Utc>) -> Result<ReconcileOutcome, CheckInError> {
        if !self.should_mark_appointments_checked_in().await? {
            debug!("{} is not enabled, skipping", SCHEDULER_MARKS_APPOINTMENT_CHECKED_IN);
            return Ok(ReconcileOutcome::Disabled);
        }

        let shift = self.visits_from_previous_days()?;
        let visit_window_start = self
            .lifecycle
            .start_of_day(now, shift)
            .ok_or_else(|| CheckInError::InvalidSetting {
                name: VISITS_FROM_PREVIOUS_DAYS.to_string(),
                value: shift.to_string(),
            })?;

        let today = self.lifecycle.today(now);
        let scheduled = self.get_appointments_scheduled_for(today.start, today.end).await?;

        if scheduled.is_empty() {
            debug!("No scheduled appointments between {} and {}", today.start, today.end);
            return Ok(ReconcileOutcome::NothingScheduled);
        }

        let patients = collect_patients(&scheduled);
        let query = VisitQuery::started_between(patients, visit_window_start, now);
        let visits = self.visits.get_visits(&query).await?;
        debug!("Found {} visits for {} scheduled appointments", visits.len(), scheduled.len());

        let mut checked_in = Vec::new();
        for appointment in &scheduled {
            if !is_corresponding_visit_present(appointment, &visits) {
                continue;
            }

            self.appointments
                .change_status(appointment, AppointmentStatus::CheckedIn, now)
                .await?;

            debug!("Appointment {} checked in for patient {}", appointment.id, appointment.patient_id);
            checked_in.push(appointment.id);
        }

        info!(
            "Check-in reconciliation finished: {} of {} scheduled appointments checked in",
            checked_in.len(),
            scheduled.len()
        );

        Ok(ReconcileOutcome::Completed {
            scheduled: scheduled.len(),
            checked_in,
        })
    }

    async fn should_mark_appointments_checked_in(&self) -> Result<bool, CheckInError> {
        let value = self
            .settings
            .get_setting(SCHEDULER_MARKS_APPOINTMENT_CHECKED_IN)
            .await?;

        Ok(value.map_or(false, |v| v.eq_ignore_ascii_case("true")))
    }

    fn visits_from_previous_days(&self) -> Result<u32, CheckInError> {
        match self.task_properties.get(VISITS_FROM_PREVIOUS_DAYS) {
            None => Ok(0),
            Some(raw) => raw.parse::<u32>().map_err(|_| CheckInError::InvalidSetting {
                name: VISITS_FROM_PREVIOUS_DAYS.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    async fn get_appointments_scheduled_for(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, CheckInError> {
        let appointments = self.appointments.get_appointments_in_range(start, end).await?;

        // A store returning the same row twice must not cause a double transition
        let mut seen = HashSet::new();
        Ok(appointments
            .into_iter()
            .filter(Appointment::is_scheduled)
            .filter(|appointment| seen.insert(appointment.id))
            .collect())
    }
}

fn collect_patients(appointments: &[Appointment]) -> Vec<Uuid> {
    appointments.iter().map(|appointment| appointment.patient_id).collect()
}

fn is_corresponding_visit_present(appointment: &Appointment, visits: &[Visit]) -> bool {
    visits.iter().any(|visit| visit.patient_id == appointment.patient_id)
}
