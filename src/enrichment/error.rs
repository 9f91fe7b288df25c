//! Enrichment error types

use thiserror::Error;

use crate::contacts::ContactError;
use crate::core_types::{ContactId, Credits};
use crate::ledger::LedgerError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentError {
    #[error("Invalid enrichment request: {0}")]
    InvalidRequest(String),

    #[error("Contact not found: {0}")]
    NotFound(ContactId),

    #[error("Insufficient credits: available {available}, required {required}")]
    InsufficientFunds { available: Credits, required: Credits },

    /// Provider failed, timed out or returned nothing usable. The debit was refunded.
    #[error("No enrichment data found ({refunded} credits refunded)")]
    NothingFound { refunded: Credits },

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Contact error: {0}")]
    Contact(ContactError),
}

impl From<ContactError> for EnrichmentError {
    fn from(e: ContactError) -> Self {
        match e {
            ContactError::NotFound(id) => EnrichmentError::NotFound(id),
            other => EnrichmentError::Contact(other),
        }
    }
}

impl EnrichmentError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            EnrichmentError::InvalidRequest(_) => "INVALID_PARAMETER",
            EnrichmentError::NotFound(_) => "CONTACT_NOT_FOUND",
            EnrichmentError::InsufficientFunds { .. } => "INSUFFICIENT_CREDITS",
            EnrichmentError::NothingFound { .. } => "NO_DATA_FOUND",
            EnrichmentError::Ledger(e) => e.code(),
            EnrichmentError::Contact(e) => e.code(),
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            EnrichmentError::InvalidRequest(_) => 400,
            EnrichmentError::NotFound(_) => 404,
            EnrichmentError::InsufficientFunds { .. } => 402,
            EnrichmentError::NothingFound { .. } => 422,
            EnrichmentError::Ledger(e) => e.http_status(),
            EnrichmentError::Contact(e) => e.http_status(),
        }
    }
}
