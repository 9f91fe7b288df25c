//! Ledger record types

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

use crate::core_types::{Credits, TransactionId, UserId};

/// Direction of a ledger row. Stored as SMALLINT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum TransactionType {
    Credit = 1,
    Debit = 2,
}

impl TransactionType {
    /// Derive the direction from a signed delta
    pub fn from_delta(delta: Credits) -> Self {
        if delta < 0 {
            TransactionType::Debit
        } else {
            TransactionType::Credit
        }
    }

    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(TransactionType::Credit),
            2 => Some(TransactionType::Debit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "credit",
            TransactionType::Debit => "debit",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable ledger row. Created once per ledger operation, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CreditTransaction {
    pub transaction_id: TransactionId,
    pub user_id: UserId,
    /// Signed: debits are negative
    pub amount: Credits,
    pub tx_type: TransactionType,
    pub description: String,
    /// Balance right after this row was applied (audit only)
    pub balance_after: Credits,
    pub created_at: DateTime<Utc>,
}

/// Result of a store-level conditional delta
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaOutcome {
    /// Delta applied and transaction appended in the same unit of work
    Applied(CreditTransaction),
    /// `balance + delta` would fall below the floor; nothing was written
    Rejected { balance: Credits },
}

/// Result of [`super::Ledger::debit`].
///
/// Insufficient funds is an ordinary outcome, not an error: callers branch on
/// it before doing any external work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Debit {
    Applied {
        balance: Credits,
        transaction_id: TransactionId,
    },
    InsufficientFunds {
        available: Credits,
        required: Credits,
    },
}

impl Debit {
    #[inline]
    pub fn is_applied(&self) -> bool {
        matches!(self, Debit::Applied { .. })
    }
}
