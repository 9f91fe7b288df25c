//! Storage backends
//!
//! - [`MemoryStore`] - process-local, used by tests and `mock-api` dev runs
//! - [`PgStore`] - PostgreSQL via sqlx
//!
//! Both implement every store trait ([`crate::account::UserStore`],
//! [`crate::ledger::LedgerStore`], [`crate::contacts::CompanyStore`],
//! [`crate::contacts::ContactStore`]) so services are wired with one handle.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::sync::Arc;

use crate::account::UserStore;
use crate::contacts::{CompanyStore, ContactStore};
use crate::db::Database;
use crate::ledger::LedgerStore;

/// One backend seen through every store seam
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub ledger: Arc<dyn LedgerStore>,
    pub companies: Arc<dyn CompanyStore>,
    pub contacts: Arc<dyn ContactStore>,
}

impl Stores {
    pub fn from_backend<S>(store: Arc<S>) -> Self
    where
        S: UserStore + LedgerStore + CompanyStore + ContactStore + 'static,
    {
        Self {
            users: store.clone(),
            ledger: store.clone(),
            companies: store.clone(),
            contacts: store,
        }
    }

    pub fn memory() -> Self {
        Self::from_backend(Arc::new(MemoryStore::new()))
    }

    pub fn postgres(db: &Database) -> Self {
        Self::from_backend(Arc::new(PgStore::new(db)))
    }
}
