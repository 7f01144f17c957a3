use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    #[serde(default)]
    pub product_id: Option<Uuid>,
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub pending_sale_id: Option<Uuid>,
    pub items: Json<Vec<SaleItem>>,
    pub total: f64,
    pub amount_paid: f64,
    pub payment_method: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const SALE_PAID: &str = "paid";
pub const SALE_PARTIAL: &str = "partial";

/// Settlement status for a sale given what has been paid so far.
pub fn settlement_status(total: f64, amount_paid: f64) -> &'static str {
    if amount_paid >= total {
        SALE_PAID
    } else {
        SALE_PARTIAL
    }
}

/// A parked ticket that has not been rung up yet.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct PendingSale {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub items: Json<Vec<SaleItem>>,
    pub total: f64,
    pub note: Option<String>,
    pub status: String,
    pub completed_sale_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const PENDING_OPEN: &str = "open";
pub const PENDING_COMPLETED: &str = "completed";
