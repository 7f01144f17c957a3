use sqlx::SqliteConnection;
use uuid::Uuid;

use super::{Applied, ExecError, ensure_amount};
use crate::db;
use crate::models::action::{CustomerUpdate, NewCustomer};

pub async fn add(conn: &mut SqliteConnection, new: &NewCustomer) -> Result<Applied, ExecError> {
    if new.name.trim().is_empty() {
        return Err(ExecError::Invalid("customer name is required".to_string()));
    }
    ensure_amount("credit_limit", new.credit_limit)?;

    let customer = db::customers::create(&mut *conn, Uuid::now_v7(), new).await?;
    Ok(Applied::entity(customer.id))
}

pub async fn update(
    conn: &mut SqliteConnection,
    update: &CustomerUpdate,
) -> Result<Applied, ExecError> {
    if let Some(limit) = update.credit_limit {
        ensure_amount("credit_limit", limit)?;
    }

    let customer = db::customers::update(&mut *conn, update)
        .await?
        .ok_or_else(|| ExecError::not_found("Customer", update.id))?;
    Ok(Applied::entity(customer.id))
}

pub async fn delete(conn: &mut SqliteConnection, id: Uuid) -> Result<Applied, ExecError> {
    if !db::customers::delete(&mut *conn, id).await? {
        return Err(ExecError::not_found("Customer", id));
    }
    Ok(Applied::entity(id))
}
