//! Background queue processor.
//!
//! A periodic sweeper that re-attempts every pending queue item through the
//! connector matching its provider. There is deliberately no backoff, no
//! poison threshold, and no dead-letter queue: an item is retried every
//! tick until a connector accepts it or its message is cleared. Racing the
//! hub's just-enqueued attempt is fine because `mark_delivered` is
//! idempotent.
use super::{Hub, RETRY_PERIOD, SEND_TIMEOUT};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Start the processor loop. The task finishes its in-flight sweep and
/// exits when the shutdown channel fires (or its sender drops).
pub fn spawn_queue_processor(hub: Hub, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
    tracing::info!(period = ?RETRY_PERIOD, "queue processor started");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(RETRY_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    tracing::info!("queue processor stopped");
                    return;
                }
                _ = ticker.tick() => {
                    process_pending(&hub).await;
                }
            }
        }
    })
}

/// One sweep over all pending queue items. Public so tests can drive ticks
/// deterministically instead of waiting out the interval.
pub async fn process_pending(hub: &Hub) {
    let pending = match hub.store().get_all_pending().await {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(error = %err, "failed to load pending queue items");
            return;
        }
    };
    metrics::gauge!("nospam_queue_pending").set(pending.len() as f64);
    if pending.is_empty() {
        return;
    }
    tracing::debug!(count = pending.len(), "processing pending deliveries");

    for item in pending {
        // Unknown provider is non-fatal: leave the item pending, it may be
        // deliverable once the provider is registered.
        let Some(connector) = hub.connector(&item.provider) else {
            tracing::debug!(provider = %item.provider, queue_id = item.id, "no connector for provider");
            continue;
        };

        match tokio::time::timeout(SEND_TIMEOUT, connector.send(&item.token, &item.payload)).await
        {
            Ok(Ok(())) => {
                if let Err(err) = hub.store().mark_delivered(item.id).await {
                    tracing::warn!(queue_id = item.id, error = %err, "failed to mark queue item delivered");
                } else {
                    metrics::counter!("nospam_deliveries_total").increment(1);
                    tracing::debug!(queue_id = item.id, token = %item.token, provider = %item.provider, "delivered queued message");
                }
            }
            Ok(Err(err)) => {
                tracing::debug!(queue_id = item.id, token = %item.token, error = %err, "delivery failed; will retry next tick");
            }
            Err(_) => {
                tracing::debug!(queue_id = item.id, token = %item.token, "delivery timed out; will retry next tick");
            }
        }
    }
}
