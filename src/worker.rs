use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::queue::QueueManager;

/// Start the queue scheduler on the current runtime.
///
/// Passes run on three triggers: an enqueue or replay (debounced), a periodic
/// tick, and startup. Completed entries past retention are pruned on their
/// own interval. The task exits once `shutdown` flips to true.
pub fn spawn(queue: Arc<QueueManager>, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(run(queue, shutdown))
}

async fn run(queue: Arc<QueueManager>, mut shutdown: watch::Receiver<bool>) {
    let config = queue.config().clone();
    let mut ticker = tokio::time::interval(config.poll_interval);
    let mut last_prune = Instant::now();

    tracing::info!("Action queue scheduler started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            _ = queue.notified() => {
                // Let a burst of enqueues land before scanning.
                tokio::select! {
                    _ = tokio::time::sleep(config.debounce) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            _ = ticker.tick() => {}
            changed = shutdown.changed() => {
                // Sender dropped.
                if changed.is_err() {
                    break;
                }
            }
        }

        if *shutdown.borrow() {
            break;
        }

        if let Err(e) = queue.process_pass().await {
            tracing::error!("Processing pass failed: {e}");
        }

        if last_prune.elapsed() >= config.prune_interval {
            last_prune = Instant::now();
            if let Err(e) = queue.clear_completed_actions().await {
                tracing::error!("Pruning completed actions failed: {e}");
            }
        }
    }

    tracing::info!("Action queue scheduler stopped");
}
