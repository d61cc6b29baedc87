// libs/appointment-cell/src/services/supabase_store.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::error::CheckInError;
use crate::models::{Appointment, AppointmentStatus, Visit, VisitQuery};
use crate::services::store::{AppointmentStore, SettingsStore, VisitStore};

fn encode_time(time: DateTime<Utc>) -> String {
    urlencoding::encode(&time.to_rfc3339()).into_owned()
}

fn in_list(ids: &[Uuid]) -> String {
    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.to_string();
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    format!("in.({})", unique.join(","))
}

fn parse_rows<T: serde::de::DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, CheckInError> {
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(CheckInError::from)
}

// ==============================================================================
// GLOBAL SETTINGS
// ==============================================================================

#[derive(Debug, Deserialize)]
struct GlobalPropertyRow {
    property_value: Option<String>,
}

pub struct SupabaseSettingsStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseSettingsStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl SettingsStore for SupabaseSettingsStore {
    async fn get_setting(&self, name: &str) -> Result<Option<String>, CheckInError> {
        let path = format!(
            "/rest/v1/global_properties?property=eq.{}&select=property,property_value",
            urlencoding::encode(name)
        );

        let rows: Vec<GlobalPropertyRow> = self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| CheckInError::StoreError(e.to_string()))?;

        if rows.len() > 1 {
            warn!("Global property {} has {} rows, using the first", name, rows.len());
        }

        Ok(rows.into_iter().next().and_then(|row| row.property_value))
    }
}

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn get_appointments_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, CheckInError> {
        let query_parts = vec![
            format!("start_date_time=lte.{}", encode_time(end)),
            format!("end_date_time=gte.{}", encode_time(start)),
            "voided=eq.false".to_string(),
        ];

        let path = format!("/rest/v1/appointments?{}&order=start_date_time.asc",
                           query_parts.join("&"));

        let result: Vec<Value> = self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| CheckInError::StoreError(e.to_string()))?;

        debug!("Fetched {} appointments between {} and {}", result.len(), start, end);
        parse_rows(result)
    }

    async fn change_status(
        &self,
        appointment: &Appointment,
        status: AppointmentStatus,
        when: DateTime<Utc>,
    ) -> Result<(), CheckInError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment.id);
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=minimal"));

        let body = json!({
            "status": status.to_string(),
            "status_changed_at": when.to_rfc3339(),
        });

        self.supabase
            .execute(Method::PATCH, &path, Some(body), Some(headers))
            .await
            .map_err(|e| CheckInError::StoreError(e.to_string()))?;

        debug!("Appointment {} moved from {} to {}", appointment.id, appointment.status, status);
        Ok(())
    }
}

// ==============================================================================
// VISITS
// ==============================================================================

pub struct SupabaseVisitStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseVisitStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn build_path(query: &VisitQuery) -> String {
        let mut query_parts = Vec::new();

        if !query.patients.is_empty() {
            query_parts.push(format!("patient_id={}", in_list(&query.patients)));
        }
        if let Some(types) = &query.visit_types {
            query_parts.push(format!("visit_type_id={}", in_list(types)));
        }
        if let Some(locations) = &query.locations {
            query_parts.push(format!("location_id={}", in_list(locations)));
        }
        if let Some(min) = query.min_start_datetime {
            query_parts.push(format!("start_datetime=gte.{}", encode_time(min)));
        }
        if let Some(max) = query.max_start_datetime {
            query_parts.push(format!("start_datetime=lte.{}", encode_time(max)));
        }
        if !query.include_inactive {
            query_parts.push("stop_datetime=is.null".to_string());
        }
        if !query.include_voided {
            query_parts.push("voided=eq.false".to_string());
        }

        if query_parts.is_empty() {
            "/rest/v1/visits?order=start_datetime.asc".to_string()
        } else {
            format!("/rest/v1/visits?{}&order=start_datetime.asc", query_parts.join("&"))
        }
    }
}

#[async_trait]
impl VisitStore for SupabaseVisitStore {
    async fn get_visits(&self, query: &VisitQuery) -> Result<Vec<Visit>, CheckInError> {
        // An empty filter would otherwise match every patient
        if query.patients.is_empty() {
            return Ok(Vec::new());
        }

        let path = Self::build_path(query);
        let result: Vec<Value> = self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| CheckInError::StoreError(e.to_string()))?;

        debug!("Fetched {} visits for {} patients", result.len(), query.patients.len());
        parse_rows(result)
    }
}
