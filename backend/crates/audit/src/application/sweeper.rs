//! Context Sweeper
//!
//! Background task removing request contexts that deferred cleanup missed
//! (aborted connections, panicking handlers).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::domain::context_store::AuditContextStore;

/// Spawn the periodic sweep on the current runtime
pub fn spawn_context_sweeper(
    store: Arc<dyn AuditContextStore>,
    interval: Duration,
    max_age: Duration,
) -> JoinHandle<()> {
    let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = store.sweep(max_age, Utc::now());
            if removed > 0 {
                tracing::info!(
                    removed = removed,
                    remaining = store.len(),
                    "Swept stale audit contexts"
                );
            } else {
                tracing::debug!(remaining = store.len(), "Audit context sweep found nothing");
            }
        }
    })
}
