use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment against a customer's credit balance.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct CreditPayment {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub amount: f64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Instalment paid toward a sale that was not settled in full.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct PartialPayment {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub amount: f64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
