use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::SaleItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
}

/// Partial update. A field that is absent or null keeps its stored value,
/// so an update can change a nullable column but never clear it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub id: Uuid,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub credit_limit: f64,
}

/// Partial update, see [`ProductUpdate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub id: Uuid,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub credit_limit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSale {
    pub customer_id: Option<Uuid>,
    pub items: Vec<SaleItem>,
    pub total: f64,
    pub amount_paid: f64,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
}

/// Partial update, see [`ProductUpdate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleUpdate {
    pub id: Uuid,
    pub items: Option<Vec<SaleItem>>,
    pub total: Option<f64>,
    pub amount_paid: Option<f64>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPendingSale {
    pub customer_id: Option<Uuid>,
    pub items: Vec<SaleItem>,
    pub total: f64,
    pub note: Option<String>,
}

/// Partial update, see [`ProductUpdate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSaleUpdate {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub items: Option<Vec<SaleItem>>,
    pub total: Option<f64>,
    pub note: Option<String>,
}

/// Rings up an open pending sale as a real sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteSale {
    pub pending_sale_id: Uuid,
    /// Defaults to the pending sale's total.
    pub amount_paid: Option<f64>,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
}

/// `password_hash` arrives already hashed; hashing happens outside the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub password_hash: String,
}

/// Partial update, see [`ProductUpdate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub role: Option<String>,
    pub password_hash: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingValue {
    pub key: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingKey {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCreditPayment {
    pub customer_id: Uuid,
    pub amount: f64,
    pub note: Option<String>,
}

/// Partial update, see [`ProductUpdate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditPaymentUpdate {
    pub id: Uuid,
    pub amount: Option<f64>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPartialPayment {
    pub sale_id: Uuid,
    pub amount: f64,
    pub note: Option<String>,
}

/// Partial update, see [`ProductUpdate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialPaymentUpdate {
    pub id: Uuid,
    pub amount: Option<f64>,
    pub note: Option<String>,
}

fn default_payment_method() -> String {
    "cash".to_string()
}

/// Every mutation the store accepts. Serialized as
/// `{"kind": "addProduct", "payload": {...}}`; `kind` is what lands in the
/// queue table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "camelCase")]
pub enum Action {
    AddProduct(NewProduct),
    UpdateProduct(ProductUpdate),
    DeleteProduct(EntityRef),
    AddCustomer(NewCustomer),
    UpdateCustomer(CustomerUpdate),
    DeleteCustomer(EntityRef),
    AddSale(NewSale),
    UpdateSale(SaleUpdate),
    DeleteSale(EntityRef),
    AddPendingSale(NewPendingSale),
    UpdatePendingSale(PendingSaleUpdate),
    DeletePendingSale(EntityRef),
    AddUser(NewUser),
    UpdateUser(UserUpdate),
    DeleteUser(EntityRef),
    AddSetting(SettingValue),
    UpdateSetting(SettingValue),
    DeleteSetting(SettingKey),
    AddCreditPayment(NewCreditPayment),
    UpdateCreditPayment(CreditPaymentUpdate),
    DeleteCreditPayment(EntityRef),
    AddPartialPayment(NewPartialPayment),
    UpdatePartialPayment(PartialPaymentUpdate),
    DeletePartialPayment(EntityRef),
    CompleteSale(CompleteSale),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    AddProduct,
    UpdateProduct,
    DeleteProduct,
    AddCustomer,
    UpdateCustomer,
    DeleteCustomer,
    AddSale,
    UpdateSale,
    DeleteSale,
    AddPendingSale,
    UpdatePendingSale,
    DeletePendingSale,
    AddUser,
    UpdateUser,
    DeleteUser,
    AddSetting,
    UpdateSetting,
    DeleteSetting,
    AddCreditPayment,
    UpdateCreditPayment,
    DeleteCreditPayment,
    AddPartialPayment,
    UpdatePartialPayment,
    DeletePartialPayment,
    CompleteSale,
}

impl ActionKind {
    pub const ALL: [ActionKind; 25] = [
        ActionKind::AddProduct,
        ActionKind::UpdateProduct,
        ActionKind::DeleteProduct,
        ActionKind::AddCustomer,
        ActionKind::UpdateCustomer,
        ActionKind::DeleteCustomer,
        ActionKind::AddSale,
        ActionKind::UpdateSale,
        ActionKind::DeleteSale,
        ActionKind::AddPendingSale,
        ActionKind::UpdatePendingSale,
        ActionKind::DeletePendingSale,
        ActionKind::AddUser,
        ActionKind::UpdateUser,
        ActionKind::DeleteUser,
        ActionKind::AddSetting,
        ActionKind::UpdateSetting,
        ActionKind::DeleteSetting,
        ActionKind::AddCreditPayment,
        ActionKind::UpdateCreditPayment,
        ActionKind::DeleteCreditPayment,
        ActionKind::AddPartialPayment,
        ActionKind::UpdatePartialPayment,
        ActionKind::DeletePartialPayment,
        ActionKind::CompleteSale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::AddProduct => "addProduct",
            ActionKind::UpdateProduct => "updateProduct",
            ActionKind::DeleteProduct => "deleteProduct",
            ActionKind::AddCustomer => "addCustomer",
            ActionKind::UpdateCustomer => "updateCustomer",
            ActionKind::DeleteCustomer => "deleteCustomer",
            ActionKind::AddSale => "addSale",
            ActionKind::UpdateSale => "updateSale",
            ActionKind::DeleteSale => "deleteSale",
            ActionKind::AddPendingSale => "addPendingSale",
            ActionKind::UpdatePendingSale => "updatePendingSale",
            ActionKind::DeletePendingSale => "deletePendingSale",
            ActionKind::AddUser => "addUser",
            ActionKind::UpdateUser => "updateUser",
            ActionKind::DeleteUser => "deleteUser",
            ActionKind::AddSetting => "addSetting",
            ActionKind::UpdateSetting => "updateSetting",
            ActionKind::DeleteSetting => "deleteSetting",
            ActionKind::AddCreditPayment => "addCreditPayment",
            ActionKind::UpdateCreditPayment => "updateCreditPayment",
            ActionKind::DeleteCreditPayment => "deleteCreditPayment",
            ActionKind::AddPartialPayment => "addPartialPayment",
            ActionKind::UpdatePartialPayment => "updatePartialPayment",
            ActionKind::DeletePartialPayment => "deletePartialPayment",
            ActionKind::CompleteSale => "completeSale",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown action kind: {s}"))
    }
}

/// Why a stored `(kind, payload)` pair could not be turned back into an `Action`.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionDecodeError {
    UnknownKind(String),
    InvalidPayload { kind: String, message: String },
}

impl std::fmt::Display for ActionDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionDecodeError::UnknownKind(kind) => write!(f, "Unknown action kind: {kind}"),
            ActionDecodeError::InvalidPayload { kind, message } => {
                write!(f, "Invalid payload for {kind}: {message}")
            }
        }
    }
}

impl std::error::Error for ActionDecodeError {}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::AddProduct(_) => ActionKind::AddProduct,
            Action::UpdateProduct(_) => ActionKind::UpdateProduct,
            Action::DeleteProduct(_) => ActionKind::DeleteProduct,
            Action::AddCustomer(_) => ActionKind::AddCustomer,
            Action::UpdateCustomer(_) => ActionKind::UpdateCustomer,
            Action::DeleteCustomer(_) => ActionKind::DeleteCustomer,
            Action::AddSale(_) => ActionKind::AddSale,
            Action::UpdateSale(_) => ActionKind::UpdateSale,
            Action::DeleteSale(_) => ActionKind::DeleteSale,
            Action::AddPendingSale(_) => ActionKind::AddPendingSale,
            Action::UpdatePendingSale(_) => ActionKind::UpdatePendingSale,
            Action::DeletePendingSale(_) => ActionKind::DeletePendingSale,
            Action::AddUser(_) => ActionKind::AddUser,
            Action::UpdateUser(_) => ActionKind::UpdateUser,
            Action::DeleteUser(_) => ActionKind::DeleteUser,
            Action::AddSetting(_) => ActionKind::AddSetting,
            Action::UpdateSetting(_) => ActionKind::UpdateSetting,
            Action::DeleteSetting(_) => ActionKind::DeleteSetting,
            Action::AddCreditPayment(_) => ActionKind::AddCreditPayment,
            Action::UpdateCreditPayment(_) => ActionKind::UpdateCreditPayment,
            Action::DeleteCreditPayment(_) => ActionKind::DeleteCreditPayment,
            Action::AddPartialPayment(_) => ActionKind::AddPartialPayment,
            Action::UpdatePartialPayment(_) => ActionKind::UpdatePartialPayment,
            Action::DeletePartialPayment(_) => ActionKind::DeletePartialPayment,
            Action::CompleteSale(_) => ActionKind::CompleteSale,
        }
    }

    /// The payload column value for this action.
    pub fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        let mut tagged = serde_json::to_value(self)?;
        Ok(tagged
            .get_mut("payload")
            .map(serde_json::Value::take)
            .unwrap_or(serde_json::Value::Null))
    }

    /// Rebuild an action from the stored `kind` and `payload` columns.
    pub fn decode(kind: &str, payload: &serde_json::Value) -> Result<Action, ActionDecodeError> {
        kind.parse::<ActionKind>()
            .map_err(|_| ActionDecodeError::UnknownKind(kind.to_string()))?;

        serde_json::from_value(json!({ "kind": kind, "payload": payload })).map_err(|e| {
            ActionDecodeError::InvalidPayload {
                kind: kind.to_string(),
                message: e.to_string(),
            }
        })
    }
}
