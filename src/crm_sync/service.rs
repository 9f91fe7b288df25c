//! Metered CRM import/export

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use ulid::Ulid;
use utoipa::ToSchema;

use super::error::CrmSyncError;
use super::gateway::{CrmSyncGateway, ExportItemResult};
use crate::contacts::{Contact, ContactService};
use crate::core_types::{ContactId, Credits, UserId};
use crate::ledger::{Debit, Ledger};

/// Creates in flight during an import
const IMPORT_CONCURRENCY: usize = 8;
/// Contacts per export call
const EXPORT_BATCH: usize = 50;
/// Export calls in flight
const EXPORT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImportItemResult {
    /// Position in the source listing
    pub index: usize,
    pub contact_id: Option<ContactId>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImportReport {
    pub source: String,
    pub imported: usize,
    pub failed: usize,
    pub items: Vec<ImportItemResult>,
    pub credits_used: Credits,
    pub credits_refunded: Credits,
    pub credits_remaining: Credits,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ExportReport {
    pub destination: String,
    pub exported: usize,
    pub failed: usize,
    pub items: Vec<ExportItemResult>,
    pub credits_used: Credits,
    pub credits_refunded: Credits,
    pub credits_remaining: Credits,
}

/// CRM sync service
///
/// Charges per record up front and refunds each record that did not make it.
/// Imported records go through [`ContactService::create`], so companies are
/// reconciled exactly as for hand-entered contacts.
#[derive(Clone)]
pub struct CrmSyncService {
    ledger: Ledger,
    contacts: ContactService,
    gateway: Arc<dyn CrmSyncGateway>,
    import_cost: Credits,
    export_cost: Credits,
}

impl CrmSyncService {
    pub fn new(
        ledger: Ledger,
        contacts: ContactService,
        gateway: Arc<dyn CrmSyncGateway>,
        import_cost: Credits,
        export_cost: Credits,
    ) -> Self {
        Self {
            ledger,
            contacts,
            gateway,
            import_cost,
            export_cost,
        }
    }

    pub async fn import(&self, user_id: UserId, source: &str) -> Result<ImportReport, CrmSyncError> {
        if source.trim().is_empty() {
            return Err(CrmSyncError::InvalidRequest("source is required".to_string()));
        }
        let op_id = Ulid::new();

        // The record count is only known after the fetch, so gate the CRM
        // call on being able to pay for at least one record.
        let available = self.ledger.balance(user_id).await?;
        if available < self.import_cost {
            info!(%op_id, user_id, available, "CRM import rejected before fetch: insufficient credits");
            return Err(CrmSyncError::InsufficientFunds {
                available,
                required: self.import_cost,
            });
        }

        let records = self.gateway.import_contacts(source).await?;
        if records.is_empty() {
            let balance = self.ledger.balance(user_id).await?;
            return Ok(ImportReport {
                source: source.to_string(),
                imported: 0,
                failed: 0,
                items: vec![],
                credits_used: 0,
                credits_refunded: 0,
                credits_remaining: balance,
            });
        }

        let charge = self.import_cost * records.len() as Credits;
        let mut balance = self
            .charge(user_id, charge, &format!("crm import: {} ({} records)", source, records.len()))
            .await?;

        info!(%op_id, user_id, source, records = records.len(), charge, crm = self.gateway.name(), "CRM import started");

        let items: Vec<ImportItemResult> = stream::iter(records.into_iter().enumerate())
            .map(|(index, patch)| {
                let contacts = self.contacts.clone();
                async move {
                    match contacts.create(user_id, patch).await {
                        Ok(contact) => ImportItemResult {
                            index,
                            contact_id: Some(contact.contact_id),
                            error: None,
                        },
                        Err(e) => ImportItemResult {
                            index,
                            contact_id: None,
                            error: Some(e.to_string()),
                        },
                    }
                }
            })
            .buffered(IMPORT_CONCURRENCY)
            .collect()
            .await;

        let failed = items.iter().filter(|i| i.error.is_some()).count();
        let refund = self.import_cost * failed as Credits;
        if refund > 0 {
            warn!(%op_id, user_id, failed, "CRM import had failed records");
            balance = self
                .ledger
                .refund(user_id, refund, &format!("crm import: {} failed records", failed))
                .await?;
        }

        info!(%op_id, user_id, imported = items.len() - failed, failed, "CRM import finished");

        Ok(ImportReport {
            source: source.to_string(),
            imported: items.len() - failed,
            failed,
            items,
            credits_used: charge - refund,
            credits_refunded: refund,
            credits_remaining: balance,
        })
    }

    /// Export the given contacts, or all owned contacts when `contact_ids` is `None`
    pub async fn export(
        &self,
        user_id: UserId,
        destination: &str,
        contact_ids: Option<Vec<ContactId>>,
    ) -> Result<ExportReport, CrmSyncError> {
        if destination.trim().is_empty() {
            return Err(CrmSyncError::InvalidRequest("destination is required".to_string()));
        }
        let op_id = Ulid::new();

        let contacts = self.owned_contacts(user_id, contact_ids).await?;
        if contacts.is_empty() {
            let balance = self.ledger.balance(user_id).await?;
            return Ok(ExportReport {
                destination: destination.to_string(),
                exported: 0,
                failed: 0,
                items: vec![],
                credits_used: 0,
                credits_refunded: 0,
                credits_remaining: balance,
            });
        }

        let charge = self.export_cost * contacts.len() as Credits;
        let mut balance = self
            .charge(
                user_id,
                charge,
                &format!("crm export: {} ({} contacts)", destination, contacts.len()),
            )
            .await?;

        info!(%op_id, user_id, destination, contacts = contacts.len(), charge, "CRM export started");

        // Owned batches: the futures must not borrow `contacts`.
        let chunks: Vec<Vec<Contact>> = contacts
            .chunks(EXPORT_BATCH)
            .map(<[Contact]>::to_vec)
            .collect();
        let batches: Vec<Vec<ExportItemResult>> = stream::iter(chunks)
            .map(|batch| {
                let gateway = self.gateway.clone();
                let destination = destination.to_string();
                async move {
                    match gateway.export_contacts(&destination, &batch).await {
                        Ok(results) => reconcile_results(&batch, results),
                        Err(e) => {
                            warn!(%op_id, size = batch.len(), error = %e, "CRM export batch failed");
                            batch
                                .iter()
                                .map(|c| ExportItemResult::failed(c.contact_id, e.to_string()))
                                .collect()
                        }
                    }
                }
            })
            .buffered(EXPORT_CONCURRENCY)
            .collect()
            .await;

        let items: Vec<ExportItemResult> = batches.into_iter().flatten().collect();
        let failed = items.iter().filter(|i| !i.ok).count();
        let refund = self.export_cost * failed as Credits;
        if refund > 0 {
            balance = self
                .ledger
                .refund(user_id, refund, &format!("crm export: {} failed contacts", failed))
                .await?;
        }

        info!(%op_id, user_id, exported = items.len() - failed, failed, "CRM export finished");

        Ok(ExportReport {
            destination: destination.to_string(),
            exported: items.len() - failed,
            failed,
            items,
            credits_used: charge - refund,
            credits_refunded: refund,
            credits_remaining: balance,
        })
    }

    async fn charge(&self, user_id: UserId, amount: Credits, description: &str) -> Result<Credits, CrmSyncError> {
        match self.ledger.debit(user_id, amount, description).await? {
            Debit::Applied { balance, .. } => Ok(balance),
            Debit::InsufficientFunds {
                available,
                required,
            } => Err(CrmSyncError::InsufficientFunds {
                available,
                required,
            }),
        }
    }

    async fn owned_contacts(
        &self,
        user_id: UserId,
        contact_ids: Option<Vec<ContactId>>,
    ) -> Result<Vec<Contact>, CrmSyncError> {
        let Some(ids) = contact_ids else {
            return Ok(self.contacts.list(user_id).await?);
        };
        let mut seen = HashSet::new();
        let mut contacts = Vec::with_capacity(ids.len());
        for id in ids {
            if seen.insert(id) {
                contacts.push(self.contacts.get(user_id, id).await?);
            }
        }
        Ok(contacts)
    }
}

/// One result per contact in `batch`, whatever the CRM actually returned.
fn reconcile_results(batch: &[Contact], results: Vec<ExportItemResult>) -> Vec<ExportItemResult> {
    batch
        .iter()
        .map(|c| {
            results
                .iter()
                .find(|r| r.contact_id == c.contact_id)
                .cloned()
                .unwrap_or_else(|| ExportItemResult::failed(c.contact_id, "no result from CRM"))
        })
        .collect()
}
