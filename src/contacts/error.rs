//! Contact error types

use thiserror::Error;

use crate::core_types::ContactId;
use crate::error::StoreError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    /// Missing, or owned by someone else. The two are indistinguishable to callers.
    #[error("Contact not found: {0}")]
    NotFound(ContactId),

    #[error("Invalid contact payload: {0}")]
    Invalid(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ContactError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            ContactError::NotFound(_) => "CONTACT_NOT_FOUND",
            ContactError::Invalid(_) => "INVALID_PARAMETER",
            ContactError::Storage(_) => "DATABASE_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            ContactError::NotFound(_) => 404,
            ContactError::Invalid(_) => 400,
            ContactError::Storage(_) => 500,
        }
    }
}

impl From<validator::ValidationErrors> for ContactError {
    fn from(e: validator::ValidationErrors) -> Self {
        ContactError::Invalid(e.to_string())
    }
}
