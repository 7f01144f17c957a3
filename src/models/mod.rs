pub mod action;
pub mod action_queue;
pub mod customer;
pub mod entity;
pub mod payment;
pub mod product;
pub mod sale;
pub mod setting;
pub mod user;

pub use action::{Action, ActionDecodeError, ActionKind};
pub use action_queue::{ActionEntry, EntryStatus, QueueStatus};
pub use customer::Customer;
pub use entity::{Entity, EntityKind};
pub use payment::{CreditPayment, PartialPayment};
pub use product::Product;
pub use sale::{PendingSale, Sale, SaleItem};
pub use setting::Setting;
pub use user::User;
