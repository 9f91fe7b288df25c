use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use utoipa::ToSchema;
use validator::Validate;

use super::error::OutreachError;
use super::writer::{Draft, MessageWriter, OutreachBrief};
use crate::contacts::ContactService;
use crate::core_types::{ContactId, Credits, UserId};
use crate::error::ProviderError;
use crate::ledger::{Debit, Ledger};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OutreachMessage {
    pub contact_id: ContactId,
    pub subject: String,
    pub body: String,
    pub writer: String,
    pub credits_used: Credits,
    pub credits_remaining: Credits,
}

/// One paid message per call; refunded when the writer fails or times out.
#[derive(Clone)]
pub struct OutreachService {
    ledger: Ledger,
    contacts: ContactService,
    writer: Arc<dyn MessageWriter>,
    cost: Credits,
    timeout: Duration,
}

impl OutreachService {
    pub fn new(
        ledger: Ledger,
        contacts: ContactService,
        writer: Arc<dyn MessageWriter>,
        cost: Credits,
        timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            contacts,
            writer,
            cost,
            timeout,
        }
    }

    pub async fn generate(
        &self,
        user_id: UserId,
        contact_id: ContactId,
        brief: OutreachBrief,
    ) -> Result<OutreachMessage, OutreachError> {
        brief.validate()?;
        let contact = self.contacts.get(user_id, contact_id).await?;

        let balance = match self
            .ledger
            .debit(user_id, self.cost, &format!("outreach message: contact {}", contact_id))
            .await?
        {
            Debit::Applied { balance, .. } => balance,
            Debit::InsufficientFunds {
                available,
                required,
            } => {
                return Err(OutreachError::InsufficientFunds {
                    available,
                    required,
                });
            }
        };

        let written = tokio::time::timeout(self.timeout, self.writer.write(&contact, &brief))
            .await
            .unwrap_or_else(|_| Err(ProviderError::Timeout(self.timeout.as_millis() as u64)));

        match written {
            Ok(Draft { subject, body }) => {
                info!(user_id, contact_id, writer = self.writer.name(), "Outreach message generated");
                Ok(OutreachMessage {
                    contact_id,
                    subject,
                    body,
                    writer: self.writer.name().to_string(),
                    credits_used: self.cost,
                    credits_remaining: balance,
                })
            }
            Err(e) => {
                warn!(user_id, contact_id, error = %e, "Outreach writer failed");
                self.ledger
                    .refund(user_id, self.cost, "outreach generation failed")
                    .await?;
                Err(OutreachError::WriterFailed {
                    reason: e.to_string(),
                    refunded: self.cost,
                })
            }
        }
    }
}
