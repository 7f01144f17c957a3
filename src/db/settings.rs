use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::Setting;

pub async fn list(pool: &SqlitePool) -> Result<Vec<Setting>, sqlx::Error> {
    sqlx::query_as::<_, Setting>("SELECT * FROM settings ORDER BY key ASC")
        .fetch_all(pool)
        .await
}

pub async fn find_by_key<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    key: &str,
) -> Result<Option<Setting>, sqlx::Error> {
    sqlx::query_as::<_, Setting>("SELECT * FROM settings WHERE key = ?1")
        .bind(key)
        .fetch_optional(executor)
        .await
}

pub async fn create<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    key: &str,
    value: &serde_json::Value,
) -> Result<Setting, sqlx::Error> {
    sqlx::query_as::<_, Setting>(
        "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3) RETURNING *",
    )
    .bind(key)
    .bind(value)
    .bind(Utc::now())
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    key: &str,
    value: &serde_json::Value,
) -> Result<Option<Setting>, sqlx::Error> {
    sqlx::query_as::<_, Setting>(
        "UPDATE settings SET value = ?2, updated_at = ?3 WHERE key = ?1 RETURNING *",
    )
    .bind(key)
    .bind(value)
    .bind(Utc::now())
    .fetch_optional(executor)
    .await
}

pub async fn delete<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    key: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM settings WHERE key = ?1")
        .bind(key)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}
