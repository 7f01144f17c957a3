use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{ActionEntry, EntryStatus, QueueStatus};

pub async fn enqueue(
    pool: &SqlitePool,
    id: Uuid,
    kind: &str,
    payload: &serde_json::Value,
    actor_id: Option<&str>,
    session_id: Option<&str>,
) -> Result<ActionEntry, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as::<_, ActionEntry>(
        "INSERT INTO action_queue (id, kind, payload, status, retry_count, actor_id, session_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, 'pending', 0, ?4, ?5, ?6, ?6) RETURNING *",
    )
    .bind(id)
    .bind(kind)
    .bind(payload)
    .bind(actor_id)
    .bind(session_id)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<ActionEntry>, sqlx::Error> {
    sqlx::query_as::<_, ActionEntry>("SELECT * FROM action_queue WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Entries in processing order: creation time, then insertion order.
pub async fn list(
    pool: &SqlitePool,
    status: Option<EntryStatus>,
) -> Result<Vec<ActionEntry>, sqlx::Error> {
    match status {
        Some(status) => {
            sqlx::query_as::<_, ActionEntry>(
                "SELECT * FROM action_queue WHERE status = ?1 ORDER BY created_at ASC, rowid ASC",
            )
            .bind(status)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, ActionEntry>(
                "SELECT * FROM action_queue ORDER BY created_at ASC, rowid ASC",
            )
            .fetch_all(pool)
            .await
        }
    }
}

pub async fn list_pending(pool: &SqlitePool) -> Result<Vec<ActionEntry>, sqlx::Error> {
    list(pool, Some(EntryStatus::Pending)).await
}

/// Pending -> InProgress. Returns false if the entry is no longer pending.
pub async fn mark_in_progress(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE action_queue SET status = 'in_progress', updated_at = ?2
         WHERE id = ?1 AND status = 'pending'",
    )
    .bind(id)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// First statement of an apply transaction. Writing before any read makes
/// SQLite hand the transaction its write lock up front.
pub async fn lock_in_progress<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE action_queue SET updated_at = ?2 WHERE id = ?1 AND status = 'in_progress'",
    )
    .bind(id)
    .bind(Utc::now())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// InProgress -> Completed. Runs inside the apply transaction.
pub async fn mark_completed<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
    entity_id: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE action_queue
         SET status = 'completed', last_error = NULL, entity_id = ?2, updated_at = ?3
         WHERE id = ?1",
    )
    .bind(id)
    .bind(entity_id)
    .bind(Utc::now())
    .execute(executor)
    .await?;
    Ok(())
}

/// InProgress -> Pending after a retryable failure.
pub async fn mark_for_retry(
    pool: &SqlitePool,
    id: Uuid,
    retry_count: i32,
    error: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE action_queue
         SET status = 'pending', retry_count = ?2, last_error = ?3, updated_at = ?4
         WHERE id = ?1",
    )
    .bind(id)
    .bind(retry_count)
    .bind(error)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

/// InProgress -> Failed. Terminal until replayed.
pub async fn mark_failed(
    pool: &SqlitePool,
    id: Uuid,
    retry_count: i32,
    error: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE action_queue
         SET status = 'failed', retry_count = ?2, last_error = ?3, updated_at = ?4
         WHERE id = ?1",
    )
    .bind(id)
    .bind(retry_count)
    .bind(error)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn count_by_status(pool: &SqlitePool) -> Result<QueueStatus, sqlx::Error> {
    let rows: Vec<(EntryStatus, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM action_queue GROUP BY status")
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .fold(QueueStatus::default(), |mut acc, (status, count)| {
            let count = count.max(0) as u64;
            match status {
                EntryStatus::Pending => acc.pending = count,
                EntryStatus::InProgress => acc.in_progress = count,
                EntryStatus::Completed => acc.completed = count,
                EntryStatus::Failed => acc.failed = count,
            }
            acc
        }))
}

/// Failed -> Pending with a fresh retry budget.
pub async fn reset_failed(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE action_queue
         SET status = 'pending', retry_count = 0, last_error = NULL, updated_at = ?1
         WHERE status = 'failed'",
    )
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn release_in_progress(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE action_queue SET status = 'pending', updated_at = ?2
         WHERE id = ?1 AND status = 'in_progress'",
    )
    .bind(id)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Entries left InProgress by a crash never committed their effect.
pub async fn reset_in_progress(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE action_queue SET status = 'pending', updated_at = ?1
         WHERE status = 'in_progress'",
    )
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_completed_before(
    pool: &SqlitePool,
    cutoff: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM action_queue WHERE status = 'completed' AND updated_at < ?1")
            .bind(cutoff)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}

/// Only entries that have not been picked up yet may be removed by hand.
pub async fn delete_pending(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM action_queue WHERE id = ?1 AND status = 'pending'")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}
