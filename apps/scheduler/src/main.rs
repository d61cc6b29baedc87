use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::FixedOffset;
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod task;

use appointment_cell::{
    AppointmentLifecycleService, CheckInReconciler, SupabaseAppointmentStore,
    SupabaseSettingsStore, SupabaseVisitStore, TaskProperties, VISITS_FROM_PREVIOUS_DAYS,
};
use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::task::CheckInTask;

#[tokio::main]
async fn main() -> Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Amae Clinic check-in scheduler");

    // Load configuration
    let config = AppConfig::from_env();
    if !config.is_configured() {
        warn!("Backend store not configured, every pass will fail until SUPABASE_URL is set");
    }

    let utc_offset = config
        .checkin_utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .with_context(|| format!(
            "CHECKIN_UTC_OFFSET_MINUTES out of range: {}",
            config.checkin_utc_offset_minutes
        ))?;

    let mut properties = TaskProperties::new();
    if let Some(days) = &config.previous_days_to_consider_visits_from {
        properties = properties.with_property(VISITS_FROM_PREVIOUS_DAYS, days);
    }

    let supabase = Arc::new(SupabaseClient::new(&config));
    let reconciler = CheckInReconciler::new(
        Arc::new(SupabaseSettingsStore::new(supabase.clone())),
        Arc::new(SupabaseAppointmentStore::new(supabase.clone())),
        Arc::new(SupabaseVisitStore::new(supabase)),
        properties,
    )
    .with_lifecycle(AppointmentLifecycleService::new(utc_offset));

    let task = CheckInTask::new(reconciler, Duration::from_secs(config.checkin_interval_seconds.max(1)));

    task.run(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await;

    info!("Check-in scheduler stopped");
    Ok(())
}
