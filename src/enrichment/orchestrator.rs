//! Paid enrichment: debit, look up, apply, refund on failure

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use ulid::Ulid;

use super::error::EnrichmentError;
use super::provider::EnrichmentProvider;
use super::types::{
    ContactProfile, EnrichmentField, EnrichmentReceipt, EnrichmentRequest, found_to_patch,
};
use crate::config::CreditCosts;
use crate::contacts::{ContactPatch, ContactService};
use crate::core_types::{ContactId, Credits, UserId};
use crate::error::ProviderError;
use crate::ledger::{Debit, Ledger};

/// Enrichment orchestrator
///
/// Flow: price -> ownership -> debit -> provider (bounded) -> apply.
/// Any failure after the debit refunds the full cost before returning.
#[derive(Clone)]
pub struct EnrichmentOrchestrator {
    ledger: Ledger,
    contacts: ContactService,
    provider: Arc<dyn EnrichmentProvider>,
    costs: CreditCosts,
    timeout: Duration,
}

impl EnrichmentOrchestrator {
    pub fn new(
        ledger: Ledger,
        contacts: ContactService,
        provider: Arc<dyn EnrichmentProvider>,
        costs: CreditCosts,
        timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            contacts,
            provider,
            costs,
            timeout,
        }
    }

    pub async fn enrich(
        &self,
        user_id: UserId,
        contact_id: ContactId,
        fields: BTreeSet<EnrichmentField>,
    ) -> Result<EnrichmentReceipt, EnrichmentError> {
        if fields.is_empty() {
            return Err(EnrichmentError::InvalidRequest(
                "at least one field must be requested".to_string(),
            ));
        }
        let request = EnrichmentRequest {
            contact_id,
            requested_fields: fields,
        };
        let cost = request.cost(&self.costs);
        let op_id = Ulid::new();

        let contact = self.contacts.get(user_id, contact_id).await?;

        let field_list = request
            .requested_fields
            .iter()
            .map(EnrichmentField::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let balance = match self
            .ledger
            .debit(
                user_id,
                cost,
                &format!("enrichment: contact {} [{}]", contact_id, field_list),
            )
            .await?
        {
            Debit::Applied { balance, .. } => balance,
            Debit::InsufficientFunds {
                available,
                required,
            } => {
                return Err(EnrichmentError::InsufficientFunds {
                    available,
                    required,
                });
            }
        };

        info!(%op_id, user_id, contact_id, cost, fields = %field_list, "Enrichment started");

        let profile = ContactProfile::from_contact(&contact);
        let lookup = tokio::time::timeout(
            self.timeout,
            self.provider.lookup(&profile, &request.requested_fields),
        )
        .await
        .unwrap_or_else(|_| Err(ProviderError::Timeout(self.timeout.as_millis() as u64)));

        let found = match lookup {
            Ok(found) => found_to_patch(&found, &request.requested_fields),
            Err(e) => {
                warn!(%op_id, user_id, contact_id, error = %e, "Enrichment provider failed");
                ContactPatch::default()
            }
        };

        if found == ContactPatch::default() {
            self.refund(user_id, cost, "enrichment failed").await?;
            return Err(EnrichmentError::NothingFound { refunded: cost });
        }

        let enriched_fields = applied_fields(&found);
        match self
            .contacts
            .apply_enrichment(user_id, contact_id, found, self.provider.name())
            .await
        {
            Ok(contact) => {
                info!(
                    %op_id,
                    user_id,
                    contact_id,
                    found = enriched_fields.len(),
                    "Enrichment applied"
                );
                Ok(EnrichmentReceipt {
                    contact,
                    enriched_fields,
                    credits_used: cost,
                    credits_remaining: balance,
                })
            }
            Err(e) => {
                warn!(%op_id, user_id, contact_id, error = %e, "Failed to apply enrichment");
                self.refund(user_id, cost, "enrichment failed").await?;
                Err(e.into())
            }
        }
    }

    async fn refund(&self, user_id: UserId, cost: Credits, reason: &str) -> Result<(), EnrichmentError> {
        if let Err(e) = self.ledger.refund(user_id, cost, reason).await {
            // Debit stands without its compensating credit; needs manual repair.
            warn!(user_id, cost, error = %e, "Enrichment refund failed");
            return Err(e.into());
        }
        Ok(())
    }
}

fn applied_fields(patch: &ContactPatch) -> Vec<EnrichmentField> {
    let mut fields = Vec::new();
    if patch.email.is_some() {
        fields.push(EnrichmentField::Email);
    }
    if patch.phone.is_some() {
        fields.push(EnrichmentField::Phone);
    }
    if patch.linkedin_url.is_some() {
        fields.push(EnrichmentField::Social);
    }
    if patch.company_name.is_some() {
        fields.push(EnrichmentField::Company);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::UserStore;
    use crate::contacts::ContactCompanyReconciler;
    use crate::enrichment::provider::MockProvider;
    use crate::enrichment::types::FoundFields;
    use crate::storage::MemoryStore;

    struct Fixture {
        ledger: Ledger,
        contacts: ContactService,
        user_id: UserId,
        contact_id: ContactId,
    }

    async fn fixture(initial: Credits) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let user = store.create_user("owner@crm.io", None).await.unwrap();
        let ledger = Ledger::new(store.clone());
        if initial > 0 {
            ledger.credit(user.user_id, initial, "top-up").await.unwrap();
        }
        let contacts = ContactService::new(
            store.clone(),
            ContactCompanyReconciler::new(store.clone()),
        );
        let contact = contacts
            .create(
                user.user_id,
                ContactPatch {
                    first_name: Some("Grace".into()),
                    last_name: Some("Hopper".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        Fixture {
            ledger,
            contacts,
            user_id: user.user_id,
            contact_id: contact.contact_id,
        }
    }

    fn orchestrator(f: &Fixture, provider: Arc<MockProvider>) -> EnrichmentOrchestrator {
        EnrichmentOrchestrator::new(
            f.ledger.clone(),
            f.contacts.clone(),
            provider,
            CreditCosts::default(),
            Duration::from_millis(200),
        )
    }

    fn fields(list: &[EnrichmentField]) -> BTreeSet<EnrichmentField> {
        list.iter().copied().collect()
    }

    fn email_only() -> FoundFields {
        let mut found = FoundFields::new();
        found.insert(EnrichmentField::Email, "grace@navy.mil".into());
        found
    }

    #[tokio::test]
    async fn test_partial_success_charges_full_cost() {
        let f = fixture(20).await;
        let provider = Arc::new(MockProvider::returning(email_only()));
        let orch = orchestrator(&f, provider.clone());

        let receipt = orch
            .enrich(
                f.user_id,
                f.contact_id,
                fields(&[EnrichmentField::Email, EnrichmentField::Phone]),
            )
            .await
            .unwrap();

        assert_eq!(receipt.credits_used, 5);
        assert_eq!(receipt.credits_remaining, 15);
        assert_eq!(receipt.enriched_fields, vec![EnrichmentField::Email]);
        assert_eq!(receipt.contact.email.as_deref(), Some("grace@navy.mil"));
        assert_eq!(receipt.contact.phone, None);
        assert!(receipt.contact.is_enriched);
        assert_eq!(receipt.contact.enrichment_source.as_deref(), Some("mock"));
        assert!(receipt.contact.enrichment_date.is_some());
        assert_eq!(f.ledger.balance(f.user_id).await.unwrap(), 15);
    }

    #[tokio::test]
    async fn test_empty_result_refunds() {
        let f = fixture(20).await;
        let orch = orchestrator(&f, Arc::new(MockProvider::returning(FoundFields::new())));

        let err = orch
            .enrich(f.user_id, f.contact_id, fields(&[EnrichmentField::Phone]))
            .await
            .unwrap_err();

        assert_eq!(err, EnrichmentError::NothingFound { refunded: 3 });
        assert_eq!(f.ledger.balance(f.user_id).await.unwrap(), 20);
        let history = f.ledger.history(f.user_id).await.unwrap();
        assert_eq!(history[0].description, "refund: enrichment failed");
        assert_eq!(history[0].amount, 3);
        assert!(f.ledger.verify_consistency(f.user_id).await.unwrap());

        let contact = f.contacts.get(f.user_id, f.contact_id).await.unwrap();
        assert!(!contact.is_enriched);
    }

    #[tokio::test]
    async fn test_provider_error_refunds() {
        let f = fixture(20).await;
        let orch = orchestrator(
            &f,
            Arc::new(MockProvider::failing(ProviderError::Transport("reset".into()))),
        );

        let err = orch
            .enrich(f.user_id, f.contact_id, fields(&[EnrichmentField::Email]))
            .await
            .unwrap_err();

        assert_eq!(err, EnrichmentError::NothingFound { refunded: 2 });
        assert_eq!(f.ledger.balance(f.user_id).await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_provider_timeout_refunds() {
        let f = fixture(20).await;
        let provider = Arc::new(MockProvider::returning(email_only()));
        provider.set_delay(Duration::from_secs(5));
        let orch = orchestrator(&f, provider.clone());

        let err = orch
            .enrich(f.user_id, f.contact_id, fields(&[EnrichmentField::Email]))
            .await
            .unwrap_err();

        assert_eq!(err, EnrichmentError::NothingFound { refunded: 2 });
        assert_eq!(provider.lookup_count(), 1);
        assert_eq!(f.ledger.balance(f.user_id).await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_insufficient_funds_skips_provider() {
        let f = fixture(1).await;
        let provider = Arc::new(MockProvider::returning(email_only()));
        let orch = orchestrator(&f, provider.clone());

        let err = orch
            .enrich(f.user_id, f.contact_id, fields(&[EnrichmentField::Email]))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            EnrichmentError::InsufficientFunds {
                available: 1,
                required: 2
            }
        );
        assert_eq!(provider.lookup_count(), 0);
        assert_eq!(f.ledger.history(f.user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_foreign_contact_not_found_before_debit() {
        let f = fixture(20).await;
        let provider = Arc::new(MockProvider::returning(email_only()));
        let orch = orchestrator(&f, provider.clone());

        let err = orch
            .enrich(f.user_id + 1000, f.contact_id, fields(&[EnrichmentField::Email]))
            .await
            .unwrap_err();

        assert_eq!(err, EnrichmentError::NotFound(f.contact_id));
        assert_eq!(provider.lookup_count(), 0);
        assert_eq!(f.ledger.balance(f.user_id).await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_empty_field_set_rejected() {
        let f = fixture(20).await;
        let orch = orchestrator(&f, Arc::new(MockProvider::returning(email_only())));

        let err = orch
            .enrich(f.user_id, f.contact_id, BTreeSet::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EnrichmentError::InvalidRequest(_)));
        assert_eq!(f.ledger.balance(f.user_id).await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_found_company_is_reconciled() {
        let f = fixture(20).await;
        let mut found = FoundFields::new();
        found.insert(EnrichmentField::Company, "  Remington   Rand ".into());
        let orch = orchestrator(&f, Arc::new(MockProvider::returning(found)));

        let receipt = orch
            .enrich(f.user_id, f.contact_id, fields(&[EnrichmentField::Company]))
            .await
            .unwrap();

        assert!(receipt.contact.company_id.is_some());
        assert_eq!(receipt.contact.company_name.as_deref(), Some("Remington Rand"));
    }
}
