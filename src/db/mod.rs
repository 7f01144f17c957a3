pub mod action_queue;
pub mod customers;
pub mod payments;
pub mod pending_sales;
pub mod products;
pub mod sales;
pub mod settings;
pub mod users;
