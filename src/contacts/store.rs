//! Contact and company storage seams

use async_trait::async_trait;

use super::models::{Company, Contact, NewCompany};
use crate::core_types::{CompanyId, ContactId, UserId};
use crate::error::StoreError;

#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn get_company(&self, company_id: CompanyId) -> Result<Option<Company>, StoreError>;

    /// Case-insensitive exact name match within one owner's companies
    async fn find_company_by_name(
        &self,
        user_id: UserId,
        name: &str,
    ) -> Result<Option<Company>, StoreError>;

    /// Insert a company. Returns `StoreError::Conflict` when the owner already
    /// has a company with the same case-insensitive name.
    async fn create_company(
        &self,
        user_id: UserId,
        company: &NewCompany,
    ) -> Result<Company, StoreError>;

    async fn list_companies(&self, user_id: UserId) -> Result<Vec<Company>, StoreError>;
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn get_contact(&self, contact_id: ContactId) -> Result<Option<Contact>, StoreError>;

    /// Insert a contact; the store assigns `contact_id` and timestamps.
    async fn insert_contact(&self, contact: &Contact) -> Result<Contact, StoreError>;

    /// Overwrite all mutable fields of an existing contact (last write wins).
    async fn update_contact(&self, contact: &Contact) -> Result<Contact, StoreError>;

    async fn list_contacts(&self, user_id: UserId) -> Result<Vec<Contact>, StoreError>;
}
