use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::action::{NewUser, UserUpdate};
use crate::models::User;

pub async fn list(pool: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username ASC")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_by_username<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?1")
        .bind(username)
        .fetch_optional(executor)
        .await
}

pub async fn create<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
    new: &NewUser,
) -> Result<User, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as::<_, User>(
        "INSERT INTO users (id, username, display_name, role, password_hash, active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6) RETURNING *",
    )
    .bind(id)
    .bind(&new.username)
    .bind(&new.display_name)
    .bind(&new.role)
    .bind(&new.password_hash)
    .bind(now)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    update: &UserUpdate,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET
             display_name = COALESCE(?2, display_name),
             role = COALESCE(?3, role),
             password_hash = COALESCE(?4, password_hash),
             active = COALESCE(?5, active),
             updated_at = ?6
         WHERE id = ?1 RETURNING *",
    )
    .bind(update.id)
    .bind(&update.display_name)
    .bind(&update.role)
    .bind(&update.password_hash)
    .bind(update.active)
    .bind(Utc::now())
    .fetch_optional(executor)
    .await
}

pub async fn delete<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}
