use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use appointment_cell::{CheckInReconciler, ReconcileOutcome};

/// Fixed-interval host for the check-in reconciler. Each pass is awaited
/// before the next tick, so passes never overlap.
pub struct CheckInTask {
    reconciler: CheckInReconciler,
    period: Duration,
}

impl CheckInTask {
    pub fn new(reconciler: CheckInReconciler, period: Duration) -> Self {
        Self { reconciler, period }
    }

    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!("Check-in task running every {:?}", self.period);

        loop {
            tokio::select! {
                biased;
                _ = ticker.tick() => self.run_once().await,
                _ = &mut shutdown => {
                    info!("Shutdown signal received, stopping check-in task");
                    break;
                }
            }
        }
    }

    async fn run_once(&self) {
        match self.reconciler.reconcile(Utc::now()).await {
            Ok(ReconcileOutcome::Completed { scheduled, checked_in }) => {
                info!("Checked in {} of {} scheduled appointments", checked_in.len(), scheduled);
            }
            Ok(_) => {}
            // The next tick retries; the pass is idempotent.
            Err(e) => error!("Check-in reconciliation failed: {}", e),
        }
    }
}
