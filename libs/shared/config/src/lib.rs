use std::env;
use std::str::FromStr;
use tracing::warn;

const DEFAULT_CHECKIN_INTERVAL_SECONDS: u64 = 300;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub checkin_interval_seconds: u64,
    pub checkin_utc_offset_minutes: i32,
    /// Raw task property; validated by the reconciler on every run.
    pub previous_days_to_consider_visits_from: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, using empty value");
                    String::new()
                }),
            checkin_interval_seconds: parse_or_default(
                "CHECKIN_INTERVAL_SECONDS",
                DEFAULT_CHECKIN_INTERVAL_SECONDS,
            ),
            checkin_utc_offset_minutes: parse_or_default("CHECKIN_UTC_OFFSET_MINUTES", 0),
            previous_days_to_consider_visits_from: env::var("PREVIOUS_DAYS_TO_CONSIDER_VISITS_FROM").ok(),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
