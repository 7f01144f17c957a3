use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::action::{CustomerUpdate, NewCustomer};
use crate::models::Customer;

pub async fn list(pool: &SqlitePool) -> Result<Vec<Customer>, sqlx::Error> {
    sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY name ASC")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn create<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
    new: &NewCustomer,
) -> Result<Customer, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as::<_, Customer>(
        "INSERT INTO customers (id, name, phone, email, credit_limit, balance, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6) RETURNING *",
    )
    .bind(id)
    .bind(&new.name)
    .bind(&new.phone)
    .bind(&new.email)
    .bind(new.credit_limit)
    .bind(now)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    update: &CustomerUpdate,
) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as::<_, Customer>(
        "UPDATE customers SET
             name = COALESCE(?2, name),
             phone = COALESCE(?3, phone),
             email = COALESCE(?4, email),
             credit_limit = COALESCE(?5, credit_limit),
             updated_at = ?6
         WHERE id = ?1 RETURNING *",
    )
    .bind(update.id)
    .bind(&update.name)
    .bind(&update.phone)
    .bind(&update.email)
    .bind(update.credit_limit)
    .bind(Utc::now())
    .fetch_optional(executor)
    .await
}

/// Adds `delta` to the outstanding balance. Returns false if the customer is missing.
pub async fn adjust_balance<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
    delta: f64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE customers SET balance = balance + ?2, updated_at = ?3 WHERE id = ?1",
    )
    .bind(id)
    .bind(delta)
    .bind(Utc::now())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn delete<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}
