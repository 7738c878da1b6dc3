//! Background overdue sweep

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use erm_application::MitigationService;

/// Periodically flag past-due mitigation actions in every organization
///
/// The first sweep runs after one full interval.
pub fn spawn_overdue_sweep(mitigations: Arc<MitigationService>, every: Duration) -> JoinHandle<()> {
    info!(interval_secs = every.as_secs(), "Starting overdue sweep");
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(every).await;
            match mitigations.refresh_all_overdue(Utc::now()).await {
                Ok(sweep) if sweep.marked_overdue.is_empty() => {
                    debug!("Overdue sweep found nothing to flag");
                }
                Ok(sweep) => {
                    info!(
                        marked_overdue = sweep.marked_overdue.len(),
                        risks_recalculated = sweep.risks_recalculated.len(),
                        "Overdue sweep completed"
                    );
                }
                Err(err) => error!(error = %err, "Overdue sweep failed"),
            }
        }
    })
}
