use thiserror::Error;

use crate::contacts::ContactError;
use crate::core_types::{ContactId, Credits};
use crate::ledger::LedgerError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutreachError {
    #[error("Invalid outreach brief: {0}")]
    InvalidRequest(String),

    #[error("Contact not found: {0}")]
    NotFound(ContactId),

    #[error("Insufficient credits: available {available}, required {required}")]
    InsufficientFunds { available: Credits, required: Credits },

    /// Writer failed or timed out. The charge was refunded.
    #[error("Message generation failed: {reason}")]
    WriterFailed { reason: String, refunded: Credits },

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Contact error: {0}")]
    Contact(ContactError),
}

impl From<ContactError> for OutreachError {
    fn from(e: ContactError) -> Self {
        match e {
            ContactError::NotFound(id) => OutreachError::NotFound(id),
            other => OutreachError::Contact(other),
        }
    }
}

impl From<validator::ValidationErrors> for OutreachError {
    fn from(e: validator::ValidationErrors) -> Self {
        OutreachError::InvalidRequest(e.to_string())
    }
}

impl OutreachError {
    pub fn code(&self) -> &'static str {
        match self {
            OutreachError::InvalidRequest(_) => "INVALID_PARAMETER",
            OutreachError::NotFound(_) => "CONTACT_NOT_FOUND",
            OutreachError::InsufficientFunds { .. } => "INSUFFICIENT_CREDITS",
            OutreachError::WriterFailed { .. } => "PROVIDER_UNAVAILABLE",
            OutreachError::Ledger(e) => e.code(),
            OutreachError::Contact(e) => e.code(),
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            OutreachError::InvalidRequest(_) => 400,
            OutreachError::NotFound(_) => 404,
            OutreachError::InsufficientFunds { .. } => 402,
            OutreachError::WriterFailed { .. } => 502,
            OutreachError::Ledger(e) => e.http_status(),
            OutreachError::Contact(e) => e.http_status(),
        }
    }
}
