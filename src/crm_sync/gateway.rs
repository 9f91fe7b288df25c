//! External CRM seam

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use utoipa::ToSchema;

use crate::contacts::{Contact, ContactPatch};
use crate::core_types::ContactId;
use crate::error::ProviderError;

/// Per-contact export result reported by the CRM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ExportItemResult {
    pub contact_id: ContactId,
    pub ok: bool,
    /// Id assigned by the CRM
    pub external_id: Option<String>,
    pub error: Option<String>,
}

impl ExportItemResult {
    pub fn failed(contact_id: ContactId, error: impl Into<String>) -> Self {
        Self {
            contact_id,
            ok: false,
            external_id: None,
            error: Some(error.into()),
        }
    }
}

/// Bidirectional contact sync with an external CRM
#[async_trait]
pub trait CrmSyncGateway: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch raw records from `source` (list, view or pipeline name)
    async fn import_contacts(&self, source: &str) -> Result<Vec<ContactPatch>, ProviderError>;

    /// Push contacts to `destination`; one result per input contact
    async fn export_contacts(
        &self,
        destination: &str,
        contacts: &[Contact],
    ) -> Result<Vec<ExportItemResult>, ProviderError>;
}

/// CRM held in memory. Sources are seeded up front; exports are recorded.
///
/// Contacts without an email are refused on export, like most CRMs that key
/// people by address.
#[derive(Default)]
pub struct InMemoryCrmGateway {
    sources: DashMap<String, Vec<ContactPatch>>,
    exported: DashMap<String, Vec<Contact>>,
    import_calls: AtomicUsize,
}

impl InMemoryCrmGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, source: &str, records: Vec<ContactPatch>) {
        self.sources.insert(source.to_string(), records);
    }

    pub fn exported(&self, destination: &str) -> Vec<Contact> {
        self.exported
            .get(destination)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Number of `import_contacts` calls received
    pub fn import_calls(&self) -> usize {
        self.import_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CrmSyncGateway for InMemoryCrmGateway {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn import_contacts(&self, source: &str) -> Result<Vec<ContactPatch>, ProviderError> {
        self.import_calls.fetch_add(1, Ordering::SeqCst);
        self.sources
            .get(source)
            .map(|r| r.value().clone())
            .ok_or_else(|| ProviderError::Rejected(format!("unknown source: {}", source)))
    }

    async fn export_contacts(
        &self,
        destination: &str,
        contacts: &[Contact],
    ) -> Result<Vec<ExportItemResult>, ProviderError> {
        let mut results = Vec::with_capacity(contacts.len());
        let mut accepted = Vec::new();
        for contact in contacts {
            if contact.email.is_none() {
                results.push(ExportItemResult::failed(contact.contact_id, "email is required"));
                continue;
            }
            accepted.push(contact.clone());
            results.push(ExportItemResult {
                contact_id: contact.contact_id,
                ok: true,
                external_id: Some(format!("mem-{}", contact.contact_id)),
                error: None,
            });
        }
        self.exported
            .entry(destination.to_string())
            .or_default()
            .extend(accepted);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_source_rejected() {
        let crm = InMemoryCrmGateway::new();
        assert!(matches!(
            crm.import_contacts("nope").await,
            Err(ProviderError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_seeded_source_round_trip() {
        let crm = InMemoryCrmGateway::new();
        crm.seed(
            "leads",
            vec![ContactPatch {
                first_name: Some("Alan".into()),
                ..Default::default()
            }],
        );
        let records = crm.import_contacts("leads").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].first_name.as_deref(), Some("Alan"));
    }
}
