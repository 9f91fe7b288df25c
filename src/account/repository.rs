//! User storage seam

use async_trait::async_trait;

use super::models::User;
use crate::core_types::UserId;
use crate::error::StoreError;

/// User repository
///
/// New users start with a zero balance; grants go through the ledger so the
/// balance and the transaction log never diverge.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user. Returns `StoreError::Conflict` if the email is taken.
    async fn create_user(&self, email: &str, name: Option<&str>) -> Result<User, StoreError>;

    /// Get user by ID
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, StoreError>;

    /// Get user by email (case-insensitive)
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}
