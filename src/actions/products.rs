use sqlx::SqliteConnection;
use uuid::Uuid;

use super::{Applied, ExecError, ensure_amount};
use crate::db;
use crate::models::action::{NewProduct, ProductUpdate};

pub async fn add(conn: &mut SqliteConnection, new: &NewProduct) -> Result<Applied, ExecError> {
    if new.name.trim().is_empty() {
        return Err(ExecError::Invalid("product name is required".to_string()));
    }
    ensure_amount("price", new.price)?;

    let product = db::products::create(&mut *conn, Uuid::now_v7(), new).await?;
    tracing::debug!("Created product {} ({})", product.id, product.name);
    Ok(Applied::entity(product.id))
}

pub async fn update(
    conn: &mut SqliteConnection,
    update: &ProductUpdate,
) -> Result<Applied, ExecError> {
    if let Some(price) = update.price {
        ensure_amount("price", price)?;
    }

    let product = db::products::update(&mut *conn, update)
        .await?
        .ok_or_else(|| ExecError::not_found("Product", update.id))?;
    Ok(Applied::entity(product.id))
}

pub async fn delete(conn: &mut SqliteConnection, id: Uuid) -> Result<Applied, ExecError> {
    if !db::products::delete(&mut *conn, id).await? {
        return Err(ExecError::not_found("Product", id));
    }
    Ok(Applied::entity(id))
}
