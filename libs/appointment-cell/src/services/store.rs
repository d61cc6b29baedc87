use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[cfg(test)]
use mockall::automock;

use crate::error::CheckInError;
use crate::models::{Appointment, AppointmentStatus, Visit, VisitQuery};

/// Host-owned global settings.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_setting(&self, name: &str) -> Result<Option<String>, CheckInError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// All appointments whose window intersects `[start, end]`, regardless of status.
    async fn get_appointments_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, CheckInError>;

    async fn change_status(
        &self,
        appointment: &Appointment,
        status: AppointmentStatus,
        when: DateTime<Utc>,
    ) -> Result<(), CheckInError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait VisitStore: Send + Sync {
    async fn get_visits(&self, query: &VisitQuery) -> Result<Vec<Visit>, CheckInError>;
}
