use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::action::{NewProduct, ProductUpdate};
use crate::models::Product;

pub async fn list(pool: &SqlitePool) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name ASC")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn create<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
    new: &NewProduct,
) -> Result<Product, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, name, sku, category, price, stock, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) RETURNING *",
    )
    .bind(id)
    .bind(&new.name)
    .bind(&new.sku)
    .bind(&new.category)
    .bind(new.price)
    .bind(new.stock)
    .bind(now)
    .fetch_one(executor)
    .await
}

/// Applies the fields that are set and leaves the rest, including nullable
/// columns, as stored. `None` if the product does not exist.
pub async fn update<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    update: &ProductUpdate,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(
        "UPDATE products SET
             name = COALESCE(?2, name),
             sku = COALESCE(?3, sku),
             category = COALESCE(?4, category),
             price = COALESCE(?5, price),
             stock = COALESCE(?6, stock),
             updated_at = ?7
         WHERE id = ?1 RETURNING *",
    )
    .bind(update.id)
    .bind(&update.name)
    .bind(&update.sku)
    .bind(&update.category)
    .bind(update.price)
    .bind(update.stock)
    .bind(Utc::now())
    .fetch_optional(executor)
    .await
}

pub async fn delete<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = ?1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}
