// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub status: AppointmentStatus,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    #[serde(default)]
    pub status_changed_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn is_scheduled(&self) -> bool {
        self.status == AppointmentStatus::Scheduled
    }

    /// True when the appointment window touches `[start, end]`.
    pub fn intersects(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_date_time <= end && self.end_date_time >= start
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    Requested,
    WaitList,
    Scheduled,
    CheckedIn,
    Completed,
    Cancelled,
    Missed,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Requested => write!(f, "Requested"),
            AppointmentStatus::WaitList => write!(f, "WaitList"),
            AppointmentStatus::Scheduled => write!(f, "Scheduled"),
            AppointmentStatus::CheckedIn => write!(f, "CheckedIn"),
            AppointmentStatus::Completed => write!(f, "Completed"),
            AppointmentStatus::Cancelled => write!(f, "Cancelled"),
            AppointmentStatus::Missed => write!(f, "Missed"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Requested" => Ok(AppointmentStatus::Requested),
            "WaitList" => Ok(AppointmentStatus::WaitList),
            "Scheduled" => Ok(AppointmentStatus::Scheduled),
            "CheckedIn" => Ok(AppointmentStatus::CheckedIn),
            "Completed" => Ok(AppointmentStatus::Completed),
            "Cancelled" => Ok(AppointmentStatus::Cancelled),
            "Missed" => Ok(AppointmentStatus::Missed),
            other => Err(format!("Unknown appointment status: {}", other)),
        }
    }
}

// ==============================================================================
// VISIT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Visit {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub start_datetime: DateTime<Utc>,
    #[serde(default)]
    pub stop_datetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub visit_type_id: Option<Uuid>,
    #[serde(default)]
    pub location_id: Option<Uuid>,
    #[serde(default)]
    pub voided: bool,
}

impl Visit {
    pub fn is_active(&self) -> bool {
        self.stop_datetime.is_none()
    }
}

/// Visit search criteria. `None` on a collection filter means "any".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitQuery {
    pub visit_types: Option<Vec<Uuid>>,
    pub patients: Vec<Uuid>,
    pub locations: Option<Vec<Uuid>>,
    pub min_start_datetime: Option<DateTime<Utc>>,
    pub max_start_datetime: Option<DateTime<Utc>>,
    pub include_inactive: bool,
    pub include_voided: bool,
}

impl VisitQuery {
    /// Active, non-voided visits of `patients` that started within `[start, end]`.
    pub fn started_between(patients: Vec<Uuid>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            patients,
            min_start_datetime: Some(start),
            max_start_datetime: Some(end),
            ..Self::default()
        }
    }

    pub fn matches(&self, visit: &Visit) -> bool {
        if !self.patients.is_empty() && !self.patients.contains(&visit.patient_id) {
            return false;
        }
        if let Some(types) = &self.visit_types {
            if !visit.visit_type_id.map_or(false, |t| types.contains(&t)) {
                return false;
            }
        }
        if let Some(locations) = &self.locations {
            if !visit.location_id.map_or(false, |l| locations.contains(&l)) {
                return false;
            }
        }
        if self.min_start_datetime.map_or(false, |min| visit.start_datetime < min) {
            return false;
        }
        if self.max_start_datetime.map_or(false, |max| visit.start_datetime > max) {
            return false;
        }
        if !self.include_inactive && !visit.is_active() {
            return false;
        }
        if !self.include_voided && visit.voided {
            return false;
        }
        true
    }
}

// ==============================================================================
// TASK CONFIGURATION
// ==============================================================================

/// Per-task properties handed over by the host scheduler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskProperties {
    properties: HashMap<String, String>,
}

impl TaskProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, name: &str, value: &str) -> Self {
        self.properties.insert(name.to_string(), value.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

// ==============================================================================
// RECONCILIATION RESULTS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The feature flag is off; nothing was read beyond the flag itself.
    Disabled,
    /// No appointment in today's window is still scheduled.
    NothingScheduled,
    Completed {
        scheduled: usize,
        checked_in: Vec<Uuid>,
    },
}

impl ReconcileOutcome {
    pub fn checked_in_count(&self) -> usize {
        match self {
            ReconcileOutcome::Completed { checked_in, .. } => checked_in.len(),
            _ => 0,
        }
    }
}
