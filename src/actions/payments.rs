use sqlx::SqliteConnection;
use uuid::Uuid;

use super::{Applied, ExecError, ensure_amount};
use crate::db;
use crate::models::action::{
    CreditPaymentUpdate, NewCreditPayment, NewPartialPayment, PartialPaymentUpdate,
};

// A credit payment lowers the customer's outstanding balance by its amount.
// The payment row is written first; a missing customer aborts the whole
// transaction, so the row never survives on its own.

pub async fn add_credit(
    conn: &mut SqliteConnection,
    new: &NewCreditPayment,
) -> Result<Applied, ExecError> {
    ensure_amount("amount", new.amount)?;

    let payment = db::payments::create_credit(
        &mut *conn,
        Uuid::now_v7(),
        new.customer_id,
        new.amount,
        new.note.as_deref(),
    )
    .await?;

    if !db::customers::adjust_balance(&mut *conn, new.customer_id, -new.amount).await? {
        return Err(ExecError::not_found("Customer", new.customer_id));
    }

    Ok(Applied::entity(payment.id))
}

pub async fn update_credit(
    conn: &mut SqliteConnection,
    update: &CreditPaymentUpdate,
) -> Result<Applied, ExecError> {
    if let Some(amount) = update.amount {
        ensure_amount("amount", amount)?;
    }

    let before = db::payments::find_credit(&mut *conn, update.id)
        .await?
        .ok_or_else(|| ExecError::not_found("Credit payment", update.id))?;

    let after = db::payments::update_credit(
        &mut *conn,
        update.id,
        update.amount,
        update.note.as_deref(),
    )
    .await?
    .ok_or_else(|| ExecError::not_found("Credit payment", update.id))?;

    let delta = after.amount - before.amount;
    if delta != 0.0 && !db::customers::adjust_balance(&mut *conn, after.customer_id, -delta).await? {
        return Err(ExecError::not_found("Customer", after.customer_id));
    }

    Ok(Applied::entity(after.id))
}

pub async fn delete_credit(conn: &mut SqliteConnection, id: Uuid) -> Result<Applied, ExecError> {
    let payment = db::payments::find_credit(&mut *conn, id)
        .await?
        .ok_or_else(|| ExecError::not_found("Credit payment", id))?;

    db::payments::delete_credit(&mut *conn, id).await?;
    // Restore the balance the payment had cleared. A customer deleted since
    // then has no balance to restore.
    db::customers::adjust_balance(&mut *conn, payment.customer_id, payment.amount).await?;

    Ok(Applied::entity(id))
}

pub async fn add_partial(
    conn: &mut SqliteConnection,
    new: &NewPartialPayment,
) -> Result<Applied, ExecError> {
    ensure_amount("amount", new.amount)?;

    let payment = db::payments::create_partial(
        &mut *conn,
        Uuid::now_v7(),
        new.sale_id,
        new.amount,
        new.note.as_deref(),
    )
    .await?;

    if !db::sales::add_to_amount_paid(&mut *conn, new.sale_id, new.amount).await? {
        return Err(ExecError::not_found("Sale", new.sale_id));
    }

    Ok(Applied::entity(payment.id))
}

pub async fn update_partial(
    conn: &mut SqliteConnection,
    update: &PartialPaymentUpdate,
) -> Result<Applied, ExecError> {
    if let Some(amount) = update.amount {
        ensure_amount("amount", amount)?;
    }

    let before = db::payments::find_partial(&mut *conn, update.id)
        .await?
        .ok_or_else(|| ExecError::not_found("Partial payment", update.id))?;

    let after = db::payments::update_partial(
        &mut *conn,
        update.id,
        update.amount,
        update.note.as_deref(),
    )
    .await?
    .ok_or_else(|| ExecError::not_found("Partial payment", update.id))?;

    let delta = after.amount - before.amount;
    if delta != 0.0 && !db::sales::add_to_amount_paid(&mut *conn, after.sale_id, delta).await? {
        return Err(ExecError::not_found("Sale", after.sale_id));
    }

    Ok(Applied::entity(after.id))
}

pub async fn delete_partial(conn: &mut SqliteConnection, id: Uuid) -> Result<Applied, ExecError> {
    let payment = db::payments::find_partial(&mut *conn, id)
        .await?
        .ok_or_else(|| ExecError::not_found("Partial payment", id))?;

    db::payments::delete_partial(&mut *conn, id).await?;
    db::sales::add_to_amount_paid(&mut *conn, payment.sale_id, -payment.amount).await?;

    Ok(Applied::entity(id))
}
