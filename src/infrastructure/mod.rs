pub mod events;
pub mod identity;
pub mod inventory;
pub mod models;
pub mod order_ledger;
