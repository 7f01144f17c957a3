//! Action executor: applies one decoded [`Action`] to the store.
//!
//! Every handler runs on the connection of a transaction owned by the queue
//! manager, which also records the entry's completion on that same
//! transaction. A handler that returns an error leaves nothing behind once
//! the transaction rolls back.

pub mod customers;
pub mod payments;
pub mod products;
pub mod sales;
pub mod settings;
pub mod users;

use sqlx::SqliteConnection;

use crate::models::Action;

/// Outcome of a successful apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Applied {
    /// Key of the entity created or touched. Generated by create handlers.
    pub entity_id: Option<String>,
}

impl Applied {
    pub fn entity(id: impl ToString) -> Self {
        Applied {
            entity_id: Some(id.to_string()),
        }
    }
}

#[derive(Debug)]
pub enum ExecError {
    NotFound { entity: &'static str, key: String },
    Conflict(String),
    Invalid(String),
    Database(sqlx::Error),
}

impl ExecError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        ExecError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecError::NotFound { entity, key } => write!(f, "{entity} {key} not found"),
            ExecError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            ExecError::Invalid(msg) => write!(f, "Invalid: {msg}"),
            ExecError::Database(err) => write!(f, "Database error: {err}"),
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecError::Database(err) => Some(err),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for ExecError {
    fn from(err: sqlx::Error) -> Self {
        ExecError::Database(err)
    }
}

pub(crate) fn ensure_amount(field: &str, value: f64) -> Result<(), ExecError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ExecError::Invalid(format!(
            "{field} must be a non-negative number, got {value}"
        )))
    }
}

impl Action {
    /// Dispatch to the handler for this kind.
    pub async fn apply(&self, conn: &mut SqliteConnection) -> Result<Applied, ExecError> {
        match self {
            Action::AddProduct(p) => products::add(conn, p).await,
            Action::UpdateProduct(p) => products::update(conn, p).await,
            Action::DeleteProduct(r) => products::delete(conn, r.id).await,
            Action::AddCustomer(p) => customers::add(conn, p).await,
            Action::UpdateCustomer(p) => customers::update(conn, p).await,
            Action::DeleteCustomer(r) => customers::delete(conn, r.id).await,
            Action::AddSale(p) => sales::add(conn, p).await,
            Action::UpdateSale(p) => sales::update(conn, p).await,
            Action::DeleteSale(r) => sales::delete(conn, r.id).await,
            Action::AddPendingSale(p) => sales::add_pending(conn, p).await,
            Action::UpdatePendingSale(p) => sales::update_pending(conn, p).await,
            Action::DeletePendingSale(r) => sales::delete_pending(conn, r.id).await,
            Action::CompleteSale(p) => sales::complete(conn, p).await,
            Action::AddUser(p) => users::add(conn, p).await,
            Action::UpdateUser(p) => users::update(conn, p).await,
            Action::DeleteUser(r) => users::delete(conn, r.id).await,
            Action::AddSetting(p) => settings::add(conn, p).await,
            Action::UpdateSetting(p) => settings::update(conn, p).await,
            Action::DeleteSetting(p) => settings::delete(conn, &p.key).await,
            Action::AddCreditPayment(p) => payments::add_credit(conn, p).await,
            Action::UpdateCreditPayment(p) => payments::update_credit(conn, p).await,
            Action::DeleteCreditPayment(r) => payments::delete_credit(conn, r.id).await,
            Action::AddPartialPayment(p) => payments::add_partial(conn, p).await,
            Action::UpdatePartialPayment(p) => payments::update_partial(conn, p).await,
            Action::DeletePartialPayment(r) => payments::delete_partial(conn, r.id).await,
        }
    }
}
