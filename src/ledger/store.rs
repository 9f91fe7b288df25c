//! Ledger storage contract

use async_trait::async_trait;

use super::types::{CreditTransaction, DeltaOutcome};
use crate::core_types::{Credits, UserId};
use crate::error::StoreError;

/// Backing store for balances and the transaction log.
///
/// # Atomicity
/// `apply_delta` MUST check the floor, write the balance and append the
/// transaction as one unit. Two concurrent calls for the same user must never
/// both pass the floor check against the same starting balance.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Materialized balance. `None` if the user does not exist.
    async fn balance(&self, user_id: UserId) -> Result<Option<Credits>, StoreError>;

    /// Apply `delta` if `balance + delta >= floor`, appending one transaction.
    ///
    /// Returns `StoreError::NotFound` for an unknown user.
    async fn apply_delta(
        &self,
        user_id: UserId,
        delta: Credits,
        floor: Credits,
        description: &str,
    ) -> Result<DeltaOutcome, StoreError>;

    /// All transactions for a user, most recent first
    async fn history(&self, user_id: UserId) -> Result<Vec<CreditTransaction>, StoreError>;
}
