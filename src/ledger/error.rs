//! Ledger error types

use thiserror::Error;

use crate::core_types::UserId;
use crate::error::StoreError;

/// Ledger errors.
///
/// Insufficient funds is deliberately absent: see [`super::Debit`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl LedgerError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidAmount => "INVALID_AMOUNT",
            LedgerError::UserNotFound(_) => "USER_NOT_FOUND",
            LedgerError::Storage(_) => "DATABASE_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            LedgerError::InvalidAmount => 400,
            LedgerError::UserNotFound(_) => 404,
            LedgerError::Storage(_) => 500,
        }
    }
}
