use serde::Serialize;

use super::{Customer, CreditPayment, PartialPayment, PendingSale, Product, Sale, Setting, User};

/// Business tables readable through the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Product,
    Customer,
    Sale,
    PendingSale,
    User,
    Setting,
    CreditPayment,
    PartialPayment,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Product,
        EntityKind::Customer,
        EntityKind::Sale,
        EntityKind::PendingSale,
        EntityKind::User,
        EntityKind::Setting,
        EntityKind::CreditPayment,
        EntityKind::PartialPayment,
    ];

    /// Collection name used in URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Product => "products",
            EntityKind::Customer => "customers",
            EntityKind::Sale => "sales",
            EntityKind::PendingSale => "pending-sales",
            EntityKind::User => "users",
            EntityKind::Setting => "settings",
            EntityKind::CreditPayment => "credit-payments",
            EntityKind::PartialPayment => "partial-payments",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown entity kind: {s}"))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Entity {
    Product(Product),
    Customer(Customer),
    Sale(Sale),
    PendingSale(PendingSale),
    User(User),
    Setting(Setting),
    CreditPayment(CreditPayment),
    PartialPayment(PartialPayment),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Product(_) => EntityKind::Product,
            Entity::Customer(_) => EntityKind::Customer,
            Entity::Sale(_) => EntityKind::Sale,
            Entity::PendingSale(_) => EntityKind::PendingSale,
            Entity::User(_) => EntityKind::User,
            Entity::Setting(_) => EntityKind::Setting,
            Entity::CreditPayment(_) => EntityKind::CreditPayment,
            Entity::PartialPayment(_) => EntityKind::PartialPayment,
        }
    }
}
