//! Verification error types

use thiserror::Error;

use crate::contacts::ContactError;
use crate::core_types::{ContactId, Credits};
use crate::ledger::LedgerError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Invalid verification request: {0}")]
    InvalidRequest(String),

    #[error("Contact not found: {0}")]
    NotFound(ContactId),

    #[error("Insufficient credits: available {available}, required {required}")]
    InsufficientFunds { available: Credits, required: Credits },

    /// The vendor refused to create a job. Charged credits were refunded in full.
    #[error("Verification job could not be started: {reason}")]
    StartFailed { reason: String, refunded: Credits },

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Contact error: {0}")]
    Contact(ContactError),
}

impl From<ContactError> for VerificationError {
    fn from(e: ContactError) -> Self {
        match e {
            ContactError::NotFound(id) => VerificationError::NotFound(id),
            other => VerificationError::Contact(other),
        }
    }
}

impl VerificationError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            VerificationError::InvalidRequest(_) => "INVALID_PARAMETER",
            VerificationError::NotFound(_) => "CONTACT_NOT_FOUND",
            VerificationError::InsufficientFunds { .. } => "INSUFFICIENT_CREDITS",
            VerificationError::StartFailed { .. } => "PROVIDER_UNAVAILABLE",
            VerificationError::Ledger(e) => e.code(),
            VerificationError::Contact(e) => e.code(),
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            VerificationError::InvalidRequest(_) => 400,
            VerificationError::NotFound(_) => 404,
            VerificationError::InsufficientFunds { .. } => 402,
            VerificationError::StartFailed { .. } => 502,
            VerificationError::Ledger(e) => e.http_status(),
            VerificationError::Contact(e) => e.http_status(),
        }
    }
}
