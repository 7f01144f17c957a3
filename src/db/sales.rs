use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::action::SaleUpdate;
use crate::models::sale::{SALE_PAID, SALE_PARTIAL, settlement_status};
use crate::models::{Sale, SaleItem};

pub struct NewSaleRow<'a> {
    pub customer_id: Option<Uuid>,
    pub pending_sale_id: Option<Uuid>,
    pub items: &'a [SaleItem],
    pub total: f64,
    pub amount_paid: f64,
    pub payment_method: &'a str,
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<Sale>, sqlx::Error> {
    sqlx::query_as::<_, Sale>("SELECT * FROM sales ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Sale>, sqlx::Error> {
    sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ?1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn create<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
    row: &NewSaleRow<'_>,
) -> Result<Sale, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as::<_, Sale>(
        "INSERT INTO sales (id, customer_id, pending_sale_id, items, total, amount_paid,
                            payment_method, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9) RETURNING *",
    )
    .bind(id)
    .bind(row.customer_id)
    .bind(row.pending_sale_id)
    .bind(Json(row.items))
    .bind(row.total)
    .bind(row.amount_paid)
    .bind(row.payment_method)
    .bind(settlement_status(row.total, row.amount_paid))
    .bind(now)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    update: &SaleUpdate,
) -> Result<Option<Sale>, sqlx::Error> {
    sqlx::query_as::<_, Sale>(
        "UPDATE sales SET
             items = COALESCE(?2, items),
             total = COALESCE(?3, total),
             amount_paid = COALESCE(?4, amount_paid),
             payment_method = COALESCE(?5, payment_method),
             status = CASE WHEN COALESCE(?4, amount_paid) >= COALESCE(?3, total)
                           THEN ?6 ELSE ?7 END,
             updated_at = ?8
         WHERE id = ?1 RETURNING *",
    )
    .bind(update.id)
    .bind(update.items.as_ref().map(Json))
    .bind(update.total)
    .bind(update.amount_paid)
    .bind(&update.payment_method)
    .bind(SALE_PAID)
    .bind(SALE_PARTIAL)
    .bind(Utc::now())
    .fetch_optional(executor)
    .await
}

/// Adds `delta` to the amount paid and re-derives the settlement status.
pub async fn add_to_amount_paid<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
    delta: f64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE sales SET
             amount_paid = amount_paid + ?2,
             status = CASE WHEN amount_paid + ?2 >= total THEN ?3 ELSE ?4 END,
             updated_at = ?5
         WHERE id = ?1",
    )
    .bind(id)
    .bind(delta)
    .bind(SALE_PAID)
    .bind(SALE_PARTIAL)
    .bind(Utc::now())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn delete<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}
