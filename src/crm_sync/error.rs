//! CRM sync error types

use thiserror::Error;

use crate::contacts::ContactError;
use crate::core_types::{ContactId, Credits};
use crate::error::ProviderError;
use crate::ledger::LedgerError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrmSyncError {
    #[error("Invalid sync request: {0}")]
    InvalidRequest(String),

    #[error("Contact not found: {0}")]
    NotFound(ContactId),

    #[error("Insufficient credits: available {available}, required {required}")]
    InsufficientFunds { available: Credits, required: Credits },

    #[error("CRM error: {0}")]
    Gateway(#[from] ProviderError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Contact error: {0}")]
    Contact(ContactError),
}

impl From<ContactError> for CrmSyncError {
    fn from(e: ContactError) -> Self {
        match e {
            ContactError::NotFound(id) => CrmSyncError::NotFound(id),
            other => CrmSyncError::Contact(other),
        }
    }
}

impl CrmSyncError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            CrmSyncError::InvalidRequest(_) => "INVALID_PARAMETER",
            CrmSyncError::NotFound(_) => "CONTACT_NOT_FOUND",
            CrmSyncError::InsufficientFunds { .. } => "INSUFFICIENT_CREDITS",
            CrmSyncError::Gateway(_) => "CRM_UNAVAILABLE",
            CrmSyncError::Ledger(e) => e.code(),
            CrmSyncError::Contact(e) => e.code(),
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            CrmSyncError::InvalidRequest(_) => 400,
            CrmSyncError::NotFound(_) => 404,
            CrmSyncError::InsufficientFunds { .. } => 402,
            CrmSyncError::Gateway(_) => 502,
            CrmSyncError::Ledger(e) => e.http_status(),
            CrmSyncError::Contact(e) => e.http_status(),
        }
    }
}
