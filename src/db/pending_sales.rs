use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::action::{NewPendingSale, PendingSaleUpdate};
use crate::models::sale::{PENDING_COMPLETED, PENDING_OPEN};
use crate::models::PendingSale;

pub async fn list(pool: &SqlitePool) -> Result<Vec<PendingSale>, sqlx::Error> {
    sqlx::query_as::<_, PendingSale>("SELECT * FROM pending_sales ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<PendingSale>, sqlx::Error> {
    sqlx::query_as::<_, PendingSale>("SELECT * FROM pending_sales WHERE id = ?1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn create<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
    new: &NewPendingSale,
) -> Result<PendingSale, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as::<_, PendingSale>(
        "INSERT INTO pending_sales (id, customer_id, items, total, note, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) RETURNING *",
    )
    .bind(id)
    .bind(new.customer_id)
    .bind(Json(&new.items))
    .bind(new.total)
    .bind(&new.note)
    .bind(PENDING_OPEN)
    .bind(now)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    update: &PendingSaleUpdate,
) -> Result<Option<PendingSale>, sqlx::Error> {
    sqlx::query_as::<_, PendingSale>(
        "UPDATE pending_sales SET
             customer_id = COALESCE(?2, customer_id),
             items = COALESCE(?3, items),
             total = COALESCE(?4, total),
             note = COALESCE(?5, note),
             updated_at = ?6
         WHERE id = ?1 RETURNING *",
    )
    .bind(update.id)
    .bind(update.customer_id)
    .bind(update.items.as_ref().map(Json))
    .bind(update.total)
    .bind(&update.note)
    .bind(Utc::now())
    .fetch_optional(executor)
    .await
}

/// Open -> completed, linking the sale it became. False unless it was open.
pub async fn mark_completed<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
    sale_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE pending_sales SET status = ?2, completed_sale_id = ?3, updated_at = ?4
         WHERE id = ?1 AND status = ?5",
    )
    .bind(id)
    .bind(PENDING_COMPLETED)
    .bind(sale_id)
    .bind(Utc::now())
    .bind(PENDING_OPEN)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn delete<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM pending_sales WHERE id = ?1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}
