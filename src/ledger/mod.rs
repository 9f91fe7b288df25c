//! Credit Ledger
//!
//! Append-only transaction log with a materialized balance column.
//!
//! # Safety Invariants
//!
//! 1. **Never Negative**: debits are conditional deltas (`credits + delta >= 0`)
//!    evaluated by the store, never read-compare-write in application code
//! 2. **Paired Writes**: every balance change appends exactly one transaction
//!    in the same unit of work
//! 3. **No-op Rejection**: an insufficient-funds debit writes nothing
//! 4. **Reserve First**: paid operations debit before calling out, and
//!    refund when the call produced nothing usable

pub mod error;
pub mod service;
pub mod store;
pub mod types;

pub use error::LedgerError;
pub use service::Ledger;
pub use store::LedgerStore;
pub use types::{CreditTransaction, Debit, DeltaOutcome, TransactionType};
