//! End-to-end paid flows over the in-memory backend

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crm_enrichment::account::UserStore;
use crm_enrichment::config::CreditCosts;
use crm_enrichment::contacts::{ContactCompanyReconciler, ContactPatch, ContactService};
use crm_enrichment::enrichment::types::{ContactProfile, FoundFields};
use crm_enrichment::enrichment::{
    EnrichmentError, EnrichmentField, EnrichmentOrchestrator, EnrichmentProvider,
};
use crm_enrichment::error::ProviderError;
use crm_enrichment::ledger::Ledger;
use crm_enrichment::storage::{MemoryStore, Stores};
use crm_enrichment::verification::{
    ExternalJobId, JobSnapshot, PollOutcome, VerificationPoller, VerificationProvider,
    VerificationRequest,
};

/// Returns an email for anyone and nothing else
struct EmailOnly;

#[async_trait]
impl EnrichmentProvider for EmailOnly {
    fn name(&self) -> &'static str {
        "email-only"
    }

    async fn lookup(
        &self,
        profile: &ContactProfile,
        _requested: &BTreeSet<EnrichmentField>,
    ) -> Result<FoundFields, ProviderError> {
        let mut found = FoundFields::new();
        found.insert(
            EnrichmentField::Email,
            format!("{}@example.com", profile.first_name.to_lowercase()),
        );
        Ok(found)
    }
}

/// Always pending; counts status queries
#[derive(Default)]
struct NeverDone {
    queries: AtomicUsize,
}

#[async_trait]
impl VerificationProvider for NeverDone {
    fn name(&self) -> &'static str {
        "never-done"
    }

    async fn start_job(&self, _req: &VerificationRequest) -> Result<ExternalJobId, ProviderError> {
        Ok(ExternalJobId("j".into()))
    }

    async fn get_status(&self, _job: &ExternalJobId) -> Result<JobSnapshot, ProviderError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(JobSnapshot {
            status: "IN_PROGRESS".into(),
            payload: serde_json::Value::Null,
        })
    }
}

struct World {
    stores: Stores,
    ledger: Ledger,
    contacts: ContactService,
    user_id: i64,
}

async fn world(credits: i64) -> World {
    let stores = Stores::from_backend(Arc::new(MemoryStore::new()));
    let user = stores.users.create_user("qa@crm.io", None).await.unwrap();
    let ledger = Ledger::new(stores.ledger.clone());
    ledger.credit(user.user_id, credits, "top-up").await.unwrap();
    let contacts = ContactService::new(
        stores.contacts.clone(),
        ContactCompanyReconciler::new(stores.companies.clone()),
    );
    World {
        stores,
        ledger,
        contacts,
        user_id: user.user_id,
    }
}

#[tokio::test]
async fn qa_partial_enrichment_charges_full_request() {
    let w = world(20).await;
    let contact = w
        .contacts
        .create(
            w.user_id,
            ContactPatch {
                first_name: Some("Ada".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let orch = EnrichmentOrchestrator::new(
        w.ledger.clone(),
        w.contacts.clone(),
        Arc::new(EmailOnly),
        CreditCosts::default(),
        Duration::from_secs(1),
    );

    let receipt = orch
        .enrich(
            w.user_id,
            contact.contact_id,
            [EnrichmentField::Email, EnrichmentField::Phone]
                .into_iter()
                .collect(),
        )
        .await
        .unwrap();

    assert_eq!(receipt.credits_used, 5);
    assert_eq!(receipt.contact.email.as_deref(), Some("ada@example.com"));
    assert_eq!(receipt.contact.phone, None);
    assert_eq!(w.ledger.balance(w.user_id).await.unwrap(), 15);
}

#[tokio::test]
async fn qa_cross_tenant_contact_is_invisible() {
    let w = world(20).await;
    let other = w.stores.users.create_user("other@crm.io", None).await.unwrap();
    let theirs = w
        .contacts
        .create(
            other.user_id,
            ContactPatch {
                first_name: Some("Eve".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let orch = EnrichmentOrchestrator::new(
        w.ledger.clone(),
        w.contacts.clone(),
        Arc::new(EmailOnly),
        CreditCosts::default(),
        Duration::from_secs(1),
    );

    let err = orch
        .enrich(
            w.user_id,
            theirs.contact_id,
            [EnrichmentField::Email].into_iter().collect(),
        )
        .await
        .unwrap_err();

    assert_eq!(err, EnrichmentError::NotFound(theirs.contact_id));
    assert_eq!(w.ledger.history(w.user_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn qa_cross_tenant_company_reference_dropped() {
    let w = world(0).await;
    let other = w.stores.users.create_user("other@crm.io", None).await.unwrap();
    let foreign = w
        .contacts
        .create(
            other.user_id,
            ContactPatch {
                first_name: Some("Eve".into()),
                company_name: Some("Evil Corp".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mine = w
        .contacts
        .create(
            w.user_id,
            ContactPatch {
                first_name: Some("Bob".into()),
                company_id: foreign.company_id,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(mine.company_id, None);
    assert_eq!(mine.company_name, None);
}

#[tokio::test]
async fn qa_poller_stops_at_budget() {
    let provider = Arc::new(NeverDone::default());
    let poller = VerificationPoller::new(provider.clone());

    let outcome = poller
        .poll_until_resolved(&ExternalJobId("j".into()), 5, Duration::from_millis(1))
        .await;

    assert_eq!(outcome, PollOutcome::Exhausted { attempts: 5 });
    assert_eq!(provider.queries.load(Ordering::SeqCst), 5);
}
