use sqlx::SqliteConnection;
use uuid::Uuid;

use super::{Applied, ExecError, ensure_amount};
use crate::db;
use crate::db::sales::NewSaleRow;
use crate::models::action::{CompleteSale, NewPendingSale, NewSale, PendingSaleUpdate, SaleUpdate};
use crate::models::sale::PENDING_OPEN;
use crate::models::SaleItem;

fn validate_items(items: &[SaleItem]) -> Result<(), ExecError> {
    if items.is_empty() {
        return Err(ExecError::Invalid("a sale needs at least one item".to_string()));
    }
    for item in items {
        if item.quantity <= 0 {
            return Err(ExecError::Invalid(format!(
                "quantity for {} must be positive",
                item.name
            )));
        }
        ensure_amount("unit_price", item.unit_price)?;
    }
    Ok(())
}

pub async fn add(conn: &mut SqliteConnection, new: &NewSale) -> Result<Applied, ExecError> {
    validate_items(&new.items)?;
    ensure_amount("total", new.total)?;
    ensure_amount("amount_paid", new.amount_paid)?;

    let row = NewSaleRow {
        customer_id: new.customer_id,
        pending_sale_id: None,
        items: &new.items,
        total: new.total,
        amount_paid: new.amount_paid,
        payment_method: &new.payment_method,
    };
    let sale = db::sales::create(&mut *conn, Uuid::now_v7(), &row).await?;
    tracing::debug!("Recorded sale {} ({})", sale.id, sale.status);
    Ok(Applied::entity(sale.id))
}

pub async fn update(conn: &mut SqliteConnection, update: &SaleUpdate) -> Result<Applied, ExecError> {
    if let Some(items) = &update.items {
        validate_items(items)?;
    }
    if let Some(total) = update.total {
        ensure_amount("total", total)?;
    }
    if let Some(paid) = update.amount_paid {
        ensure_amount("amount_paid", paid)?;
    }

    let sale = db::sales::update(&mut *conn, update)
        .await?
        .ok_or_else(|| ExecError::not_found("Sale", update.id))?;
    Ok(Applied::entity(sale.id))
}

pub async fn delete(conn: &mut SqliteConnection, id: Uuid) -> Result<Applied, ExecError> {
    if !db::sales::delete(&mut *conn, id).await? {
        return Err(ExecError::not_found("Sale", id));
    }
    Ok(Applied::entity(id))
}

pub async fn add_pending(
    conn: &mut SqliteConnection,
    new: &NewPendingSale,
) -> Result<Applied, ExecError> {
    validate_items(&new.items)?;
    ensure_amount("total", new.total)?;

    let pending = db::pending_sales::create(&mut *conn, Uuid::now_v7(), new).await?;
    Ok(Applied::entity(pending.id))
}

pub async fn update_pending(
    conn: &mut SqliteConnection,
    update: &PendingSaleUpdate,
) -> Result<Applied, ExecError> {
    if let Some(items) = &update.items {
        validate_items(items)?;
    }
    if let Some(total) = update.total {
        ensure_amount("total", total)?;
    }

    let pending = db::pending_sales::find_by_id(&mut *conn, update.id)
        .await?
        .ok_or_else(|| ExecError::not_found("Pending sale", update.id))?;
    if pending.status != PENDING_OPEN {
        return Err(ExecError::Conflict(format!(
            "pending sale {} is already {}",
            pending.id, pending.status
        )));
    }

    db::pending_sales::update(&mut *conn, update)
        .await?
        .ok_or_else(|| ExecError::not_found("Pending sale", update.id))?;
    Ok(Applied::entity(update.id))
}

pub async fn delete_pending(conn: &mut SqliteConnection, id: Uuid) -> Result<Applied, ExecError> {
    if !db::pending_sales::delete(&mut *conn, id).await? {
        return Err(ExecError::not_found("Pending sale", id));
    }
    Ok(Applied::entity(id))
}

/// Turns an open pending sale into a sale. The new sale's id is the entity id.
pub async fn complete(
    conn: &mut SqliteConnection,
    complete: &CompleteSale,
) -> Result<Applied, ExecError> {
    let pending = db::pending_sales::find_by_id(&mut *conn, complete.pending_sale_id)
        .await?
        .ok_or_else(|| ExecError::not_found("Pending sale", complete.pending_sale_id))?;

    if pending.status != PENDING_OPEN {
        return Err(ExecError::Conflict(format!(
            "pending sale {} is already {}",
            pending.id, pending.status
        )));
    }

    let amount_paid = complete.amount_paid.unwrap_or(pending.total);
    ensure_amount("amount_paid", amount_paid)?;

    let row = NewSaleRow {
        customer_id: pending.customer_id,
        pending_sale_id: Some(pending.id),
        items: &pending.items.0,
        total: pending.total,
        amount_paid,
        payment_method: &complete.payment_method,
    };
    let sale = db::sales::create(&mut *conn, Uuid::now_v7(), &row).await?;

    if !db::pending_sales::mark_completed(&mut *conn, pending.id, sale.id).await? {
        return Err(ExecError::Conflict(format!(
            "pending sale {} changed while completing",
            pending.id
        )));
    }

    tracing::debug!("Completed pending sale {} as sale {}", pending.id, sale.id);
    Ok(Applied::entity(sale.id))
}
