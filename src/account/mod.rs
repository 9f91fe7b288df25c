//! Account management module
//!
//! Tenant identities. Balances are read-only here; see [`crate::ledger`].

pub mod models;
pub mod repository;

pub use models::User;
pub use repository::UserStore;
