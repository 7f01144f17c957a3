//! Durable action queue.
//!
//! Every mutation of the store is persisted as an [`ActionEntry`] first and
//! applied later by a processing pass. Entry lifecycle:
//!
//! ```text
//! pending -> in_progress -> completed
//!                        -> pending   (retryable failure, retry_count < max_retries)
//!                        -> failed    (budget spent, or not retryable)
//!                        -> pending   (outcome could not be recorded)
//! failed  -> pending                  (replay only, retry_count reset to 0)
//! ```
//!
//! An action's effect and its `completed` mark commit in one transaction,
//! so a crash at any point leaves the action either fully applied and
//! completed, or unapplied and due for another attempt.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::futures::Notified;
use tokio::sync::{Mutex, Notify, broadcast};
use uuid::Uuid;

use crate::actions::{Applied, ExecError};
use crate::config::QueueConfig;
use crate::db;
use crate::models::{Action, ActionDecodeError, ActionEntry, EntryStatus, QueueStatus};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug)]
pub enum QueueError {
    /// The handler rejected or failed to apply the action.
    Execution(ExecError),
    /// The store could not run or commit a statement.
    Persistence(sqlx::Error),
    /// The handler did not finish within the configured bound.
    Timeout(Duration),
    UnknownKind(String),
    InvalidPayload { kind: String, message: String },
    NotFound(Uuid),
    Closed,
}

impl QueueError {
    /// Whether another attempt could succeed. Non-retryable failures skip the
    /// retry budget and fail the entry at once.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            QueueError::Execution(_) | QueueError::Persistence(_) | QueueError::Timeout(_)
        )
    }
}

impl std::fmt::Display for QueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueError::Execution(err) => write!(f, "Execution failed: {err}"),
            QueueError::Persistence(err) => write!(f, "Persistence failed: {err}"),
            QueueError::Timeout(limit) => {
                write!(f, "Handler timed out after {}ms", limit.as_millis())
            }
            QueueError::UnknownKind(kind) => write!(f, "Unknown action kind: {kind}"),
            QueueError::InvalidPayload { kind, message } => {
                write!(f, "Invalid payload for {kind}: {message}")
            }
            QueueError::NotFound(id) => write!(f, "Queue entry {id} not found"),
            QueueError::Closed => write!(f, "Action queue is shut down"),
        }
    }
}

impl std::error::Error for QueueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueueError::Execution(err) => Some(err),
            QueueError::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for QueueError {
    fn from(err: sqlx::Error) -> Self {
        QueueError::Persistence(err)
    }
}

impl From<ExecError> for QueueError {
    fn from(err: ExecError) -> Self {
        QueueError::Execution(err)
    }
}

impl From<ActionDecodeError> for QueueError {
    fn from(err: ActionDecodeError) -> Self {
        match err {
            ActionDecodeError::UnknownKind(kind) => QueueError::UnknownKind(kind),
            ActionDecodeError::InvalidPayload { kind, message } => {
                QueueError::InvalidPayload { kind, message }
            }
        }
    }
}

/// Terminal result of one attempt cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    Completed { entity_id: Option<String> },
    Failed { error: String, retry_count: i32 },
}

impl ActionOutcome {
    fn from_entry(entry: &ActionEntry) -> Option<ActionOutcome> {
        match entry.status {
            EntryStatus::Completed => Some(ActionOutcome::Completed {
                entity_id: entry.entity_id.clone(),
            }),
            EntryStatus::Failed => Some(ActionOutcome::Failed {
                error: entry.last_error.clone().unwrap_or_default(),
                retry_count: entry.retry_count,
            }),
            EntryStatus::Pending | EntryStatus::InProgress => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionEvent {
    pub action_id: Uuid,
    pub kind: String,
    pub outcome: ActionOutcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Another pass held the guard, or the store was closed.
    pub skipped: bool,
    pub attempted: usize,
    pub completed: usize,
    pub retried: usize,
    pub failed: usize,
    /// Entries whose outcome could not be recorded. They are put back to
    /// pending and picked up by a later pass.
    pub errored: usize,
}

impl PassReport {
    fn skipped() -> Self {
        PassReport {
            skipped: true,
            ..PassReport::default()
        }
    }
}

enum Attempt {
    Completed,
    Retried,
    Failed,
    Skipped,
}

pub struct QueueManager {
    pool: SqlitePool,
    config: QueueConfig,
    session_id: String,
    pass_lock: Mutex<()>,
    trigger: Notify,
    events: broadcast::Sender<ActionEvent>,
}

impl QueueManager {
    pub fn new(pool: SqlitePool, config: QueueConfig, session_id: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        QueueManager {
            pool,
            config,
            session_id: session_id.into(),
            pass_lock: Mutex::new(()),
            trigger: Notify::new(),
            events,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Ask for a pass without waiting for it. Repeated triggers before the
    /// scheduler wakes collapse into one.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    /// Resolves on the next trigger.
    pub fn notified(&self) -> Notified<'_> {
        self.trigger.notified()
    }

    /// Persist an action as `pending` and schedule a pass. The returned id
    /// tracks the queue entry only; the entity id is chosen by the handler
    /// when the action is applied.
    pub async fn enqueue(&self, action: &Action, actor_id: Option<&str>) -> Result<Uuid, QueueError> {
        let kind = action.kind();
        let payload = action.payload().map_err(|e| QueueError::InvalidPayload {
            kind: kind.to_string(),
            message: e.to_string(),
        })?;
        self.enqueue_raw(kind.as_str(), &payload, actor_id).await
    }

    /// Persist an already-serialized intent without validating it. A kind
    /// or payload that does not decode fails the entry on its first pass.
    pub async fn enqueue_raw(
        &self,
        kind: &str,
        payload: &serde_json::Value,
        actor_id: Option<&str>,
    ) -> Result<Uuid, QueueError> {
        let id = Uuid::now_v7();
        db::action_queue::enqueue(
            &self.pool,
            id,
            kind,
            payload,
            actor_id,
            Some(&self.session_id),
        )
        .await?;

        tracing::debug!("Enqueued action {id} ({kind})");
        self.trigger();
        Ok(id)
    }

    /// Attempt every entry that is pending right now, oldest first.
    ///
    /// At most one pass runs at a time. A call that finds a pass in flight
    /// returns a skipped report and re-arms the trigger, so whatever it was
    /// meant to pick up is handled by the next pass.
    pub async fn process_pass(&self) -> Result<PassReport, QueueError> {
        let Ok(_guard) = self.pass_lock.try_lock() else {
            tracing::debug!("Processing pass already running");
            self.trigger();
            return Ok(PassReport::skipped());
        };

        if self.pool.is_closed() {
            tracing::warn!("Store is closed, skipping processing pass");
            return Ok(PassReport::skipped());
        }

        let pending = db::action_queue::list_pending(&self.pool).await?;
        let mut report = PassReport::default();

        for entry in pending {
            let id = entry.id;
            match self.process_entry(entry).await {
                Ok(Attempt::Completed) => report.completed += 1,
                Ok(Attempt::Retried) => report.retried += 1,
                Ok(Attempt::Failed) => report.failed += 1,
                Ok(Attempt::Skipped) => continue,
                Err(err) => {
                    tracing::error!("Could not record outcome of queue entry {id}: {err}");
                    self.release(id).await;
                    report.errored += 1;
                }
            }
            report.attempted += 1;
        }

        if report.attempted > 0 {
            tracing::info!(
                "Processing pass: {} attempted, {} completed, {} retried, {} failed, {} errored",
                report.attempted,
                report.completed,
                report.retried,
                report.failed,
                report.errored
            );
        }

        Ok(report)
    }

    async fn process_entry(&self, entry: ActionEntry) -> Result<Attempt, QueueError> {
        if !db::action_queue::mark_in_progress(&self.pool, entry.id).await? {
            tracing::debug!("Queue entry {} is no longer pending", entry.id);
            return Ok(Attempt::Skipped);
        }

        tracing::debug!(
            "Processing queue entry {} (kind={}, attempt={})",
            entry.id,
            entry.kind,
            entry.retry_count + 1
        );

        let result = match Action::decode(&entry.kind, &entry.payload) {
            Ok(action) => self.apply_and_complete(entry.id, &action).await,
            Err(err) => Err(QueueError::from(err)),
        };

        match result {
            Ok(applied) => {
                self.publish(&entry, ActionOutcome::Completed {
                    entity_id: applied.entity_id,
                });
                Ok(Attempt::Completed)
            }
            Err(err) if !err.is_retryable() => {
                let error = err.to_string();
                tracing::error!("Queue entry {} ({}) cannot be applied: {error}", entry.id, entry.kind);
                db::action_queue::mark_failed(&self.pool, entry.id, entry.retry_count, &error)
                    .await?;
                self.publish(&entry, ActionOutcome::Failed {
                    error,
                    retry_count: entry.retry_count,
                });
                Ok(Attempt::Failed)
            }
            Err(err) => {
                let error = err.to_string();
                let retry_count = entry.retry_count + 1;

                if retry_count >= self.config.max_retries {
                    tracing::warn!(
                        "Queue entry {} ({}) failed after {retry_count} attempts: {error}",
                        entry.id,
                        entry.kind
                    );
                    db::action_queue::mark_failed(&self.pool, entry.id, retry_count, &error)
                        .await?;
                    self.publish(&entry, ActionOutcome::Failed { error, retry_count });
                    Ok(Attempt::Failed)
                } else {
                    tracing::debug!(
                        "Queue entry {} ({}) attempt {retry_count} failed, will retry: {error}",
                        entry.id,
                        entry.kind
                    );
                    db::action_queue::mark_for_retry(&self.pool, entry.id, retry_count, &error)
                        .await?;
                    Ok(Attempt::Retried)
                }
            }
        }
    }

    /// Put an entry stuck in progress back to pending. A failure here leaves
    /// it for the startup reset.
    async fn release(&self, id: Uuid) {
        match db::action_queue::release_in_progress(&self.pool, id).await {
            Ok(true) => tracing::debug!("Queue entry {id} released back to pending"),
            Ok(false) => {}
            Err(err) => tracing::error!("Could not release queue entry {id}: {err}"),
        }
    }

    /// Apply the effect and mark the entry completed in a single transaction.
    /// Any error drops the transaction, rolling back both.
    async fn apply_and_complete(&self, id: Uuid, action: &Action) -> Result<Applied, QueueError> {
        let mut tx = self.pool.begin().await?;

        if !db::action_queue::lock_in_progress(&mut *tx, id).await? {
            return Err(QueueError::NotFound(id));
        }

        let applied = match self.config.handler_timeout {
            Some(limit) => tokio::time::timeout(limit, action.apply(&mut tx))
                .await
                .map_err(|_| QueueError::Timeout(limit))??,
            None => action.apply(&mut tx).await?,
        };

        db::action_queue::mark_completed(&mut *tx, id, applied.entity_id.as_deref()).await?;
        tx.commit().await?;

        Ok(applied)
    }

    fn publish(&self, entry: &ActionEntry, outcome: ActionOutcome) {
        // No subscribers is the common case.
        let _ = self.events.send(ActionEvent {
            action_id: entry.id,
            kind: entry.kind.clone(),
            outcome,
        });
    }

    /// Reopen every failed entry with a fresh retry budget and schedule a
    /// pass. Returns how many were reopened; zero is a no-op, not an error.
    pub async fn replay_failed_actions(&self) -> Result<u64, QueueError> {
        let replayed = db::action_queue::reset_failed(&self.pool).await?;
        if replayed == 0 {
            tracing::debug!("Replay requested with no failed actions");
            return Ok(0);
        }

        tracing::info!("Replaying {replayed} failed actions");
        self.trigger();
        Ok(replayed)
    }

    /// Delete completed entries older than the retention window.
    pub async fn clear_completed_actions(&self) -> Result<u64, QueueError> {
        let Ok(retention) = chrono::Duration::from_std(self.config.retention) else {
            return Ok(0);
        };
        let Some(cutoff) = Utc::now().checked_sub_signed(retention) else {
            return Ok(0);
        };

        let cleared = db::action_queue::delete_completed_before(&self.pool, cutoff).await?;
        if cleared > 0 {
            tracing::info!("Pruned {cleared} completed actions");
        }
        Ok(cleared)
    }

    /// Remove an entry that has not been picked up yet. Returns false when
    /// the entry is absent or already past `pending`.
    pub async fn dequeue(&self, id: Uuid) -> Result<bool, QueueError> {
        let removed = db::action_queue::delete_pending(&self.pool, id).await?;
        if removed {
            tracing::info!("Dequeued action {id}");
        }
        Ok(removed)
    }

    /// Return entries stranded `in_progress` by a crash to `pending`. Their
    /// effects never committed, so their retry budget is left as is. Call
    /// once at startup, before the first pass.
    pub async fn recover_interrupted(&self) -> Result<u64, QueueError> {
        let recovered = db::action_queue::reset_in_progress(&self.pool).await?;
        if recovered > 0 {
            tracing::warn!("Recovered {recovered} interrupted actions");
            self.trigger();
        }
        Ok(recovered)
    }

    pub async fn queue_status(&self) -> Result<QueueStatus, QueueError> {
        Ok(db::action_queue::count_by_status(&self.pool).await?)
    }

    pub async fn entry(&self, id: Uuid) -> Result<Option<ActionEntry>, QueueError> {
        Ok(db::action_queue::find_by_id(&self.pool, id).await?)
    }

    pub async fn entries(&self, status: Option<EntryStatus>) -> Result<Vec<ActionEntry>, QueueError> {
        Ok(db::action_queue::list(&self.pool, status).await?)
    }

    /// Stream of terminal outcomes for all actions.
    pub fn subscribe(&self) -> broadcast::Receiver<ActionEvent> {
        self.events.subscribe()
    }

    /// Wait until the entry reaches `completed` or `failed`. An entry that
    /// already has is answered from the store. Never resolves for an entry
    /// that is dequeued while waiting; bound it with a timeout if that matters.
    pub async fn wait_for(&self, id: Uuid) -> Result<ActionOutcome, QueueError> {
        let mut events = self.events.subscribe();

        loop {
            let entry = db::action_queue::find_by_id(&self.pool, id)
                .await?
                .ok_or(QueueError::NotFound(id))?;
            if let Some(outcome) = ActionOutcome::from_entry(&entry) {
                return Ok(outcome);
            }

            loop {
                match events.recv().await {
                    Ok(event) if event.action_id == id => return Ok(event.outcome),
                    Ok(_) => continue,
                    // Missed events; the store has the answer.
                    Err(broadcast::error::RecvError::Lagged(_)) => break,
                    Err(broadcast::error::RecvError::Closed) => return Err(QueueError::Closed),
                }
            }
        }
    }
}
