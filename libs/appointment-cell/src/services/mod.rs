pub mod lifecycle;
pub mod reconciler;
pub mod store;
pub mod supabase_store;

pub use lifecycle::{AppointmentLifecycleService, DayWindow};
pub use reconciler::{CheckInReconciler, SCHEDULER_MARKS_APPOINTMENT_CHECKED_IN, VISITS_FROM_PREVIOUS_DAYS};
pub use store::{AppointmentStore, SettingsStore, VisitStore};
pub use supabase_store::{SupabaseAppointmentStore, SupabaseSettingsStore, SupabaseVisitStore};
