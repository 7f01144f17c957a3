use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{CreditPayment, PartialPayment};

pub async fn list_credit(pool: &SqlitePool) -> Result<Vec<CreditPayment>, sqlx::Error> {
    sqlx::query_as::<_, CreditPayment>("SELECT * FROM credit_payments ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn find_credit<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<CreditPayment>, sqlx::Error> {
    sqlx::query_as::<_, CreditPayment>("SELECT * FROM credit_payments WHERE id = ?1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn create_credit<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
    customer_id: Uuid,
    amount: f64,
    note: Option<&str>,
) -> Result<CreditPayment, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as::<_, CreditPayment>(
        "INSERT INTO credit_payments (id, customer_id, amount, note, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5) RETURNING *",
    )
    .bind(id)
    .bind(customer_id)
    .bind(amount)
    .bind(note)
    .bind(now)
    .fetch_one(executor)
    .await
}

pub async fn update_credit<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
    amount: Option<f64>,
    note: Option<&str>,
) -> Result<Option<CreditPayment>, sqlx::Error> {
    sqlx::query_as::<_, CreditPayment>(
        "UPDATE credit_payments SET
             amount = COALESCE(?2, amount),
             note = COALESCE(?3, note),
             updated_at = ?4
         WHERE id = ?1 RETURNING *",
    )
    .bind(id)
    .bind(amount)
    .bind(note)
    .bind(Utc::now())
    .fetch_optional(executor)
    .await
}

pub async fn delete_credit<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM credit_payments WHERE id = ?1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn list_partial(pool: &SqlitePool) -> Result<Vec<PartialPayment>, sqlx::Error> {
    sqlx::query_as::<_, PartialPayment>("SELECT * FROM partial_payments ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn find_partial<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<PartialPayment>, sqlx::Error> {
    sqlx::query_as::<_, PartialPayment>("SELECT * FROM partial_payments WHERE id = ?1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn create_partial<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
    sale_id: Uuid,
    amount: f64,
    note: Option<&str>,
) -> Result<PartialPayment, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as::<_, PartialPayment>(
        "INSERT INTO partial_payments (id, sale_id, amount, note, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5) RETURNING *",
    )
    .bind(id)
    .bind(sale_id)
    .bind(amount)
    .bind(note)
    .bind(now)
    .fetch_one(executor)
    .await
}

pub async fn update_partial<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
    amount: Option<f64>,
    note: Option<&str>,
) -> Result<Option<PartialPayment>, sqlx::Error> {
    sqlx::query_as::<_, PartialPayment>(
        "UPDATE partial_payments SET
             amount = COALESCE(?2, amount),
             note = COALESCE(?3, note),
             updated_at = ?4
         WHERE id = ?1 RETURNING *",
    )
    .bind(id)
    .bind(amount)
    .bind(note)
    .bind(Utc::now())
    .fetch_optional(executor)
    .await
}

pub async fn delete_partial<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM partial_payments WHERE id = ?1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}
