//! Ledger service - sole authority over `users.credits`

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::LedgerError;
use super::store::LedgerStore;
use super::types::{CreditTransaction, Debit, DeltaOutcome};
use crate::core_types::{Credits, UserId};
use crate::error::StoreError;

/// Balances never go below zero.
const BALANCE_FLOOR: Credits = 0;

/// Credit ledger
///
/// Every balance change is one conditional delta against the store, paired
/// with exactly one transaction row. Nothing here retries: a rejected or
/// failed debit left the balance untouched.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn LedgerStore>,
}

impl Ledger {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Debit `amount` credits.
    ///
    /// Returns `Debit::InsufficientFunds` without writing anything when the
    /// balance is short.
    pub async fn debit(
        &self,
        user_id: UserId,
        amount: Credits,
        description: &str,
    ) -> Result<Debit, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }

        match self
            .apply(user_id, -amount, BALANCE_FLOOR, description)
            .await?
        {
            DeltaOutcome::Applied(tx) => {
                debug!(
                    user_id,
                    amount,
                    balance = tx.balance_after,
                    "Credits debited: {}",
                    description
                );
                Ok(Debit::Applied {
                    balance: tx.balance_after,
                    transaction_id: tx.transaction_id,
                })
            }
            DeltaOutcome::Rejected { balance } => {
                info!(
                    user_id,
                    required = amount,
                    available = balance,
                    "Debit rejected: insufficient credits"
                );
                Ok(Debit::InsufficientFunds {
                    available: balance,
                    required: amount,
                })
            }
        }
    }

    /// Credit `amount` credits (top-up or refund). Returns the new balance.
    pub async fn credit(
        &self,
        user_id: UserId,
        amount: Credits,
        description: &str,
    ) -> Result<Credits, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }

        // Floor of MIN: an increment is never rejected.
        match self
            .apply(user_id, amount, Credits::MIN, description)
            .await?
        {
            DeltaOutcome::Applied(tx) => {
                debug!(
                    user_id,
                    amount,
                    balance = tx.balance_after,
                    "Credits credited: {}",
                    description
                );
                Ok(tx.balance_after)
            }
            DeltaOutcome::Rejected { balance } => {
                // Unreachable with a MIN floor; surfaced rather than swallowed.
                warn!(user_id, amount, balance, "Store rejected an unconditional credit");
                Err(LedgerError::Storage(StoreError::Database(
                    "credit rejected by store".to_string(),
                )))
            }
        }
    }

    /// Compensating credit for a paid operation that produced nothing usable.
    pub async fn refund(
        &self,
        user_id: UserId,
        amount: Credits,
        reason: &str,
    ) -> Result<Credits, LedgerError> {
        let balance = self
            .credit(user_id, amount, &format!("refund: {}", reason))
            .await?;
        info!(user_id, amount, balance, "Refunded credits: {}", reason);
        Ok(balance)
    }

    /// Current balance (materialized column, never summed)
    pub async fn balance(&self, user_id: UserId) -> Result<Credits, LedgerError> {
        self.store
            .balance(user_id)
            .await?
            .ok_or(LedgerError::UserNotFound(user_id))
    }

    /// Transaction history, most recent first
    pub async fn history(&self, user_id: UserId) -> Result<Vec<CreditTransaction>, LedgerError> {
        // Distinguish "no rows" from "no such user".
        self.balance(user_id).await?;
        Ok(self.store.history(user_id).await?)
    }

    /// Rebuild the balance from the transaction log. Consistency checks only.
    pub async fn reconstruct(&self, user_id: UserId) -> Result<Credits, LedgerError> {
        Ok(self.history(user_id).await?.iter().map(|t| t.amount).sum())
    }

    /// Whether the materialized balance matches the transaction log
    pub async fn verify_consistency(&self, user_id: UserId) -> Result<bool, LedgerError> {
        let balance = self.balance(user_id).await?;
        let rebuilt = self.reconstruct(user_id).await?;
        if balance != rebuilt {
            warn!(user_id, balance, rebuilt, "Ledger drift detected");
        }
        Ok(balance == rebuilt)
    }

    async fn apply(
        &self,
        user_id: UserId,
        delta: Credits,
        floor: Credits,
        description: &str,
    ) -> Result<DeltaOutcome, LedgerError> {
        self.store
            .apply_delta(user_id, delta, floor, description)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => LedgerError::UserNotFound(user_id),
                other => LedgerError::Storage(other),
            })
    }
}
