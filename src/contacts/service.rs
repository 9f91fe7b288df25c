//! Reconciled contact write path
//!
//! Every contact create/update (API, CRM import, enrichment) goes through
//! here so validation, ownership and company reconciliation always run.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use super::error::ContactError;
use super::models::{Contact, ContactPatch};
use super::reconciler::ContactCompanyReconciler;
use super::store::ContactStore;
use crate::core_types::{ContactId, UserId};

#[derive(Clone)]
pub struct ContactService {
    contacts: Arc<dyn ContactStore>,
    reconciler: ContactCompanyReconciler,
}

impl ContactService {
    pub fn new(contacts: Arc<dyn ContactStore>, reconciler: ContactCompanyReconciler) -> Self {
        Self {
            contacts,
            reconciler,
        }
    }

    /// Create a contact owned by `user_id`
    pub async fn create(&self, user_id: UserId, patch: ContactPatch) -> Result<Contact, ContactError> {
        patch.validate()?;
        if patch.first_name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            return Err(ContactError::Invalid("first_name is required".to_string()));
        }

        let resolved = self.reconciler.reconcile(user_id, patch, None).await?;
        let contact = self
            .contacts
            .insert_contact(&Contact::from_patch(user_id, resolved))
            .await?;

        info!(
            user_id,
            contact_id = contact.contact_id,
            company_id = ?contact.company_id,
            "Contact created"
        );
        Ok(contact)
    }

    /// Fetch a contact, enforcing ownership
    pub async fn get(&self, user_id: UserId, contact_id: ContactId) -> Result<Contact, ContactError> {
        match self.contacts.get_contact(contact_id).await? {
            Some(contact) if contact.user_id == user_id => Ok(contact),
            _ => Err(ContactError::NotFound(contact_id)),
        }
    }

    pub async fn list(&self, user_id: UserId) -> Result<Vec<Contact>, ContactError> {
        Ok(self.contacts.list_contacts(user_id).await?)
    }

    /// Apply a user-supplied patch
    pub async fn update(
        &self,
        user_id: UserId,
        contact_id: ContactId,
        patch: ContactPatch,
    ) -> Result<Contact, ContactError> {
        patch.validate()?;
        self.write(user_id, contact_id, patch, |_| {}).await
    }

    /// Apply provider-found fields and stamp the enrichment metadata
    pub async fn apply_enrichment(
        &self,
        user_id: UserId,
        contact_id: ContactId,
        found: ContactPatch,
        source: &str,
    ) -> Result<Contact, ContactError> {
        let source = source.to_string();
        self.write(user_id, contact_id, found, move |c| {
            c.is_enriched = true;
            c.enrichment_source = Some(source);
            c.enrichment_date = Some(Utc::now());
        })
        .await
    }

    /// Record a verification verdict, optionally storing a found address
    /// Store a deliverability verdict for `checked_email`.
    ///
    /// The verdict is dropped when the contact's address changed while the
    /// check was running.
    pub async fn record_email_verification(
        &self,
        user_id: UserId,
        contact_id: ContactId,
        checked_email: &str,
        verified: bool,
    ) -> Result<Contact, ContactError> {
        let checked = checked_email.to_string();
        self.write(user_id, contact_id, ContactPatch::default(), move |c| {
            if c.email.as_deref() == Some(checked.as_str()) {
                c.email_verified = verified;
            } else {
                debug!(contact_id, "Email changed during verification, verdict not stored");
            }
        })
        .await
    }

    async fn write<F>(
        &self,
        user_id: UserId,
        contact_id: ContactId,
        patch: ContactPatch,
        stamp: F,
    ) -> Result<Contact, ContactError>
    where
        F: FnOnce(&mut Contact) + Send,
    {
        let mut contact = self.get(user_id, contact_id).await?;
        let resolved = self
            .reconciler
            .reconcile(user_id, patch, Some(&contact))
            .await?;

        contact.apply_patch(resolved);
        stamp(&mut contact);

        Ok(self.contacts.update_contact(&contact).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::UserStore;
    use crate::contacts::CompanyStore;
    use crate::storage::MemoryStore;

    async fn setup() -> (ContactService, Arc<MemoryStore>, UserId, UserId) {
        let store = Arc::new(MemoryStore::new());
        let alice = store.create_user("alice@x.io", None).await.unwrap().user_id;
        let bob = store.create_user("bob@x.io", None).await.unwrap().user_id;
        let service = ContactService::new(
            store.clone(),
            ContactCompanyReconciler::new(store.clone()),
        );
        (service, store, alice, bob)
    }

    fn patch(first: &str, company: Option<&str>) -> ContactPatch {
        ContactPatch {
            first_name: Some(first.into()),
            last_name: Some("Hopper".into()),
            company_name: company.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_links_company() {
        let (service, store, alice, _) = setup().await;

        let contact = service.create(alice, patch("Grace", Some("Navy"))).await.unwrap();

        assert!(contact.contact_id > 0);
        let company = store.get_company(contact.company_id.unwrap()).await.unwrap().unwrap();
        assert_eq!(contact.company_name.as_deref(), Some(company.name.as_str()));
    }

    #[tokio::test]
    async fn test_create_requires_first_name() {
        let (service, _, alice, _) = setup().await;
        let err = service.create(alice, ContactPatch::default()).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_PARAMETER");
    }

    #[tokio::test]
    async fn test_update_foreign_contact_is_not_found() {
        let (service, _, alice, bob) = setup().await;
        let contact = service.create(alice, patch("Grace", None)).await.unwrap();

        let err = service
            .update(bob, contact.contact_id, patch("Mallory", None))
            .await
            .unwrap_err();

        assert_eq!(err, ContactError::NotFound(contact.contact_id));
        let unchanged = service.get(alice, contact.contact_id).await.unwrap();
        assert_eq!(unchanged.first_name, "Grace");
    }

    #[tokio::test]
    async fn test_update_company_rename_relinks() {
        let (service, store, alice, _) = setup().await;
        let contact = service.create(alice, patch("Grace", Some("Navy"))).await.unwrap();

        let updated = service
            .update(
                alice,
                contact.contact_id,
                ContactPatch {
                    company_name: Some("Univac".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_ne!(updated.company_id, contact.company_id);
        assert_eq!(updated.company_name.as_deref(), Some("Univac"));
        assert_eq!(store.list_companies(alice).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_apply_enrichment_stamps_metadata() {
        let (service, _, alice, _) = setup().await;
        let contact = service.create(alice, patch("Grace", None)).await.unwrap();

        let enriched = service
            .apply_enrichment(
                alice,
                contact.contact_id,
                ContactPatch {
                    email: Some("grace@navy.mil".into()),
                    ..Default::default()
                },
                "synthetic",
            )
            .await
            .unwrap();

        assert!(enriched.is_enriched);
        assert_eq!(enriched.enrichment_source.as_deref(), Some("synthetic"));
        assert!(enriched.enrichment_date.is_some());
        assert_eq!(enriched.email.as_deref(), Some("grace@navy.mil"));
    }
}
