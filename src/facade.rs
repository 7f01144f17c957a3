use std::sync::Arc;

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db;
use crate::models::{Action, ActionEntry, Entity, EntityKind, EntryStatus, QueueStatus};
use crate::queue::{ActionOutcome, PassReport, QueueError, QueueManager};

/// Entry point for everything outside the queue.
///
/// Writes are enqueued and return a queue entry id; they are applied later
/// by a processing pass. Reads go straight to the store and do not see
/// writes that are still queued. Callers that need read-after-write use
/// [`PosClient::write_and_wait`], or flush and then read.
#[derive(Clone)]
pub struct PosClient {
    queue: Arc<QueueManager>,
}

impl PosClient {
    pub fn new(queue: Arc<QueueManager>) -> Self {
        PosClient { queue }
    }

    pub fn queue(&self) -> &Arc<QueueManager> {
        &self.queue
    }

    fn pool(&self) -> &SqlitePool {
        self.queue.pool()
    }

    pub async fn write(&self, action: Action) -> Result<Uuid, QueueError> {
        self.queue.enqueue(&action, None).await
    }

    pub async fn write_as(&self, action: Action, actor_id: &str) -> Result<Uuid, QueueError> {
        self.queue.enqueue(&action, Some(actor_id)).await
    }

    /// Enqueue and wait for the terminal outcome. Needs a running scheduler
    /// (or someone calling [`PosClient::flush`]) to make progress.
    pub async fn write_and_wait(&self, action: Action) -> Result<ActionOutcome, QueueError> {
        let id = self.queue.enqueue(&action, None).await?;
        self.queue.wait_for(id).await
    }

    /// Current committed state of one entity. Keys are UUIDs except for
    /// settings, which are keyed by name. A malformed key reads as absent.
    pub async fn read(&self, kind: EntityKind, key: &str) -> Result<Option<Entity>, sqlx::Error> {
        let pool = self.pool();

        if kind == EntityKind::Setting {
            return Ok(db::settings::find_by_key(pool, key)
                .await?
                .map(Entity::Setting));
        }

        let Ok(id) = key.parse::<Uuid>() else {
            return Ok(None);
        };

        let entity = match kind {
            EntityKind::Product => db::products::find_by_id(pool, id).await?.map(Entity::Product),
            EntityKind::Customer => db::customers::find_by_id(pool, id)
                .await?
                .map(Entity::Customer),
            EntityKind::Sale => db::sales::find_by_id(pool, id).await?.map(Entity::Sale),
            EntityKind::PendingSale => db::pending_sales::find_by_id(pool, id)
                .await?
                .map(Entity::PendingSale),
            EntityKind::User => db::users::find_by_id(pool, id).await?.map(Entity::User),
            EntityKind::CreditPayment => db::payments::find_credit(pool, id)
                .await?
                .map(Entity::CreditPayment),
            EntityKind::PartialPayment => db::payments::find_partial(pool, id)
                .await?
                .map(Entity::PartialPayment),
            EntityKind::Setting => None,
        };

        Ok(entity)
    }

    pub async fn read_all(&self, kind: EntityKind) -> Result<Vec<Entity>, sqlx::Error> {
        let pool = self.pool();

        let entities = match kind {
            EntityKind::Product => wrap(db::products::list(pool).await?, Entity::Product),
            EntityKind::Customer => wrap(db::customers::list(pool).await?, Entity::Customer),
            EntityKind::Sale => wrap(db::sales::list(pool).await?, Entity::Sale),
            EntityKind::PendingSale => wrap(db::pending_sales::list(pool).await?, Entity::PendingSale),
            EntityKind::User => wrap(db::users::list(pool).await?, Entity::User),
            EntityKind::Setting => wrap(db::settings::list(pool).await?, Entity::Setting),
            EntityKind::CreditPayment => {
                wrap(db::payments::list_credit(pool).await?, Entity::CreditPayment)
            }
            EntityKind::PartialPayment => {
                wrap(db::payments::list_partial(pool).await?, Entity::PartialPayment)
            }
        };

        Ok(entities)
    }

    pub async fn queue_status(&self) -> Result<QueueStatus, QueueError> {
        self.queue.queue_status().await
    }

    pub async fn replay_failed_actions(&self) -> Result<u64, QueueError> {
        self.queue.replay_failed_actions().await
    }

    pub async fn clear_completed_actions(&self) -> Result<u64, QueueError> {
        self.queue.clear_completed_actions().await
    }

    /// Run a processing pass now instead of waiting for the scheduler.
    pub async fn flush(&self) -> Result<PassReport, QueueError> {
        self.queue.process_pass().await
    }

    pub async fn dequeue(&self, id: Uuid) -> Result<bool, QueueError> {
        self.queue.dequeue(id).await
    }

    pub async fn entry(&self, id: Uuid) -> Result<Option<ActionEntry>, QueueError> {
        self.queue.entry(id).await
    }

    pub async fn entries(&self, status: Option<EntryStatus>) -> Result<Vec<ActionEntry>, QueueError> {
        self.queue.entries(status).await
    }
}

fn wrap<T>(rows: Vec<T>, variant: fn(T) -> Entity) -> Vec<Entity> {
    rows.into_iter().map(variant).collect()
}
