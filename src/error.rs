//! Errors shared by the storage and provider seams.
//!
//! Module-level error enums wrap these with `#[from]` so each service keeps
//! its own taxonomy while backends stay interchangeable.

use thiserror::Error;

/// Storage backend failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    /// A uniqueness constraint rejected the write (e.g. duplicate company name)
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Record not found: {0}")]
    NotFound(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => StoreError::NotFound(e.to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            _ => StoreError::Database(e.to_string()),
        }
    }
}

/// External provider failure (enrichment source, verification vendor, CRM, writer).
///
/// "Nothing found" is never an error; providers return an empty result for it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Network blip or 5xx; worth retrying within a budget
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider answered but refused the request (bad input, vendor out of funds)
    #[error("Provider rejected request: {0}")]
    Rejected(String),

    #[error("Provider call timed out after {0} ms")]
    Timeout(u64),

    #[error("Unexpected provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Whether a retry inside a bounded loop may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transport(_) | ProviderError::Timeout(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout(0)
        } else if e.is_decode() {
            ProviderError::Decode(e.to_string())
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}
