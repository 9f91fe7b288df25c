//! Paid email verification and email finding

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use ulid::Ulid;
use utoipa::ToSchema;

use super::error::VerificationError;
use super::policy::{Refund, RefundPolicy};
use super::poller::{PollOutcome, VerificationPoller};
use super::provider::{VerificationProvider, VerificationRequest};
use super::status::{JobStatus, ResolvedResult};
use crate::contacts::{ContactPatch, ContactService};
use crate::core_types::{ContactId, Credits, UserId};
use crate::ledger::{Debit, Ledger};

/// Result of a verification/finder call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct VerificationReceipt {
    pub contact_id: ContactId,
    pub email: Option<String>,
    pub is_valid: bool,
    /// Vendor status, `UNKNOWN`, `PROVIDER_ERROR` or `EXHAUSTED`
    pub status_code: String,
    pub message: String,
    pub credits_used: Credits,
    pub credits_refunded: Credits,
    pub credits_remaining: Credits,
}

/// Poll budget for one job
#[derive(Debug, Clone, Copy)]
pub struct PollBudget {
    pub max_attempts: u32,
    pub interval: Duration,
}

#[derive(Clone)]
pub struct VerificationService {
    ledger: Ledger,
    contacts: ContactService,
    provider: Arc<dyn VerificationProvider>,
    poller: VerificationPoller,
    verify_cost: Credits,
    find_cost: Credits,
    budget: PollBudget,
}

enum Flow {
    Verify,
    Find,
}

impl VerificationService {
    pub fn new(
        ledger: Ledger,
        contacts: ContactService,
        provider: Arc<dyn VerificationProvider>,
        verify_cost: Credits,
        find_cost: Credits,
        budget: PollBudget,
    ) -> Self {
        Self {
            ledger,
            contacts,
            poller: VerificationPoller::new(provider.clone()),
            provider,
            verify_cost,
            find_cost,
            budget,
        }
    }

    /// Check the deliverability of the contact's current email
    pub async fn verify_email(
        &self,
        user_id: UserId,
        contact_id: ContactId,
        policy: &RefundPolicy,
    ) -> Result<VerificationReceipt, VerificationError> {
        let contact = self.contacts.get(user_id, contact_id).await?;
        let email = contact
            .email
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| VerificationError::InvalidRequest("contact has no email".to_string()))?;

        self.run(
            user_id,
            contact_id,
            VerificationRequest::VerifyEmail { email },
            Flow::Verify,
            policy,
        )
        .await
    }

    /// Look up an email from the contact's name and company
    pub async fn find_email(
        &self,
        user_id: UserId,
        contact_id: ContactId,
        policy: &RefundPolicy,
    ) -> Result<VerificationReceipt, VerificationError> {
        let contact = self.contacts.get(user_id, contact_id).await?;
        let company = contact
            .company_name
            .clone()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                VerificationError::InvalidRequest("contact has no company to search".to_string())
            })?;

        self.run(
            user_id,
            contact_id,
            VerificationRequest::FindEmail {
                first_name: contact.first_name.clone(),
                last_name: contact.last_name.clone(),
                domain_or_company: company,
            },
            Flow::Find,
            policy,
        )
        .await
    }

    async fn run(
        &self,
        user_id: UserId,
        contact_id: ContactId,
        request: VerificationRequest,
        flow: Flow,
        policy: &RefundPolicy,
    ) -> Result<VerificationReceipt, VerificationError> {
        let op_id = Ulid::new();
        let cost = match flow {
            Flow::Verify => self.verify_cost,
            Flow::Find => self.find_cost,
        };

        let mut balance = match self
            .ledger
            .debit(
                user_id,
                cost,
                &format!("{}: contact {}", request.kind(), contact_id),
            )
            .await?
        {
            Debit::Applied { balance, .. } => balance,
            Debit::InsufficientFunds {
                available,
                required,
            } => {
                return Err(VerificationError::InsufficientFunds {
                    available,
                    required,
                });
            }
        };

        let job_id = match self.provider.start_job(&request).await {
            Ok(job_id) => job_id,
            Err(e) => {
                warn!(%op_id, user_id, contact_id, error = %e, "Verification job not started");
                self.ledger
                    .refund(user_id, cost, &format!("{} not started", request.kind()))
                    .await?;
                return Err(VerificationError::StartFailed {
                    reason: e.to_string(),
                    refunded: cost,
                });
            }
        };

        info!(
            %op_id,
            user_id,
            contact_id,
            job_id = %job_id,
            provider = self.provider.name(),
            kind = request.kind(),
            "Verification job started"
        );

        let outcome = self
            .poller
            .poll_until_resolved(&job_id, self.budget.max_attempts, self.budget.interval)
            .await;

        let (result, refund) = match outcome {
            PollOutcome::Resolved(result) => {
                let refund = match result.status {
                    JobStatus::Success => Refund::None,
                    JobStatus::NegativeResult => policy.on_negative,
                    _ => policy.on_error,
                };
                (result, refund)
            }
            PollOutcome::Exhausted { attempts } => (
                ResolvedResult {
                    status: JobStatus::Pending,
                    is_valid: false,
                    status_code: "EXHAUSTED".to_string(),
                    message: format!("No answer after {} status checks", attempts),
                    email: None,
                },
                policy.on_exhausted,
            ),
        };

        let mut refund_amount = refund.amount(cost);

        // A successful find without an address is treated as a negative result.
        let found_email = match flow {
            Flow::Find => result.email.clone(),
            Flow::Verify => None,
        };
        if matches!(flow, Flow::Find) && result.is_valid && found_email.is_none() {
            refund_amount = policy.on_negative.amount(cost);
        }

        let checked_email = match &request {
            VerificationRequest::VerifyEmail { email } => Some(email.as_str()),
            VerificationRequest::FindEmail { .. } => None,
        };
        if let Err(e) = self
            .record(user_id, contact_id, &result, checked_email, found_email.clone())
            .await
        {
            warn!(%op_id, user_id, contact_id, error = %e, "Failed to store verification result");
            self.ledger
                .refund(user_id, cost, &format!("{} failed", request.kind()))
                .await?;
            return Err(e);
        }

        if refund_amount > 0 {
            balance = self
                .ledger
                .refund(
                    user_id,
                    refund_amount,
                    &format!("{} {}", request.kind(), result.status_code.to_lowercase()),
                )
                .await?;
        }

        info!(
            %op_id,
            user_id,
            contact_id,
            status = %result.status_code,
            refunded = refund_amount,
            "Verification finished"
        );

        Ok(VerificationReceipt {
            contact_id,
            email: found_email,
            is_valid: result.is_valid,
            status_code: result.status_code,
            message: result.message,
            credits_used: cost - refund_amount,
            credits_refunded: refund_amount,
            credits_remaining: balance,
        })
    }

    async fn record(
        &self,
        user_id: UserId,
        contact_id: ContactId,
        result: &ResolvedResult,
        checked_email: Option<&str>,
        found_email: Option<String>,
    ) -> Result<(), VerificationError> {
        let delivered = matches!(result.status, JobStatus::Success | JobStatus::NegativeResult);
        match checked_email {
            Some(email) if delivered => {
                self.contacts
                    .record_email_verification(user_id, contact_id, email, result.is_valid)
                    .await?;
            }
            None if found_email.is_some() => {
                self.contacts
                    .update(
                        user_id,
                        contact_id,
                        ContactPatch {
                            email: found_email,
                            ..Default::default()
                        },
                    )
                    .await?;
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::UserStore;
    use crate::contacts::ContactCompanyReconciler;
    use crate::error::ProviderError;
    use crate::storage::MemoryStore;
    use crate::verification::provider::mock::{ScriptedProvider, found, snapshot};
    use crate::verification::provider::{ExternalJobId, JobSnapshot};

    struct Fixture {
        ledger: Ledger,
        contacts: ContactService,
        user_id: UserId,
        contact_id: ContactId,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let user = store.create_user("owner@crm.io", None).await.unwrap();
        let ledger = Ledger::new(store.clone());
        ledger.credit(user.user_id, 10, "top-up").await.unwrap();
        let contacts = ContactService::new(
            store.clone(),
            ContactCompanyReconciler::new(store.clone()),
        );
        let contact = contacts
            .create(
                user.user_id,
                ContactPatch {
                    first_name: Some("Ada".into()),
                    last_name: Some("Lovelace".into()),
                    email: Some("ada@acme.com".into()),
                    company_name: Some("Acme".into()),
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

    fn service(f: &Fixture, provider: Arc<ScriptedProvider>) -> VerificationService {
        VerificationService::new(
            f.ledger.clone(),
            f.contacts.clone(),
            provider,
            1,
            2,
            PollBudget {
                max_attempts: 3,
                interval: Duration::from_millis(1),
            },
        )
    }

    fn keep_on_negative() -> RefundPolicy {
        RefundPolicy {
            on_negative: Refund::None,
            on_error: Refund::Full,
            on_exhausted: Refund::Full,
        }
    }

    #[tokio::test]
    async fn test_verify_success_marks_contact() {
        let f = fixture().await;
        let svc = service(&f, Arc::new(ScriptedProvider::new(vec![snapshot("FOUND")])));

        let receipt = svc
            .verify_email(f.user_id, f.contact_id, &keep_on_negative())
            .await
            .unwrap();

        assert!(receipt.is_valid);
        assert_eq!(receipt.credits_used, 1);
        assert_eq!(receipt.credits_remaining, 9);
        let contact = f.contacts.get(f.user_id, f.contact_id).await.unwrap();
        assert!(contact.email_verified);
    }

    #[tokio::test]
    async fn test_verify_negative_keeps_charge_under_policy() {
        let f = fixture().await;
        let svc = service(&f, Arc::new(ScriptedProvider::new(vec![snapshot("NOT_FOUND")])));

        let receipt = svc
            .verify_email(f.user_id, f.contact_id, &keep_on_negative())
            .await
            .unwrap();

        assert!(!receipt.is_valid);
        assert_eq!(receipt.credits_refunded, 0);
        assert_eq!(f.ledger.balance(f.user_id).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_find_negative_full_refund() {
        let f = fixture().await;
        let svc = service(&f, Arc::new(ScriptedProvider::new(vec![snapshot("NOT_FOUND")])));

        let receipt = svc
            .find_email(f.user_id, f.contact_id, &RefundPolicy::full())
            .await
            .unwrap();

        assert_eq!(receipt.credits_refunded, 2);
        assert_eq!(receipt.credits_used, 0);
        assert_eq!(f.ledger.balance(f.user_id).await.unwrap(), 10);
        assert!(f.ledger.verify_consistency(f.user_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_success_stores_email() {
        let f = fixture().await;
        let svc = service(
            &f,
            Arc::new(ScriptedProvider::new(vec![snapshot("IN_PROGRESS"), found("ada.l@acme.com")])),
        );

        let receipt = svc
            .find_email(f.user_id, f.contact_id, &RefundPolicy::full())
            .await
            .unwrap();

        assert_eq!(receipt.email.as_deref(), Some("ada.l@acme.com"));
        assert_eq!(f.ledger.balance(f.user_id).await.unwrap(), 8);
        let contact = f.contacts.get(f.user_id, f.contact_id).await.unwrap();
        assert_eq!(contact.email.as_deref(), Some("ada.l@acme.com"));
    }

    #[tokio::test]
    async fn test_start_failure_refunds_fully() {
        let f = fixture().await;
        let provider = Arc::new(ScriptedProvider::failing_start(ProviderError::Transport(
            "refused".into(),
        )));
        let svc = service(&f, provider.clone());

        let err = svc
            .verify_email(f.user_id, f.contact_id, &keep_on_negative())
            .await
            .unwrap_err();

        assert!(matches!(err, VerificationError::StartFailed { refunded: 1, .. }));
        assert_eq!(provider.status_count(), 0);
        assert_eq!(f.ledger.balance(f.user_id).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_exhausted_uses_policy() {
        let f = fixture().await;
        let provider = Arc::new(ScriptedProvider::new(vec![snapshot("SCHEDULED")]));
        let svc = service(&f, provider.clone());
        let policy = RefundPolicy {
            on_negative: Refund::Full,
            on_error: Refund::Full,
            on_exhausted: Refund::Partial { retain: 1 },
        };

        let receipt = svc
            .find_email(f.user_id, f.contact_id, &policy)
            .await
            .unwrap();

        assert_eq!(receipt.status_code, "EXHAUSTED");
        assert_eq!(provider.status_count(), 3);
        assert_eq!(receipt.credits_refunded, 1);
        assert_eq!(f.ledger.balance(f.user_id).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_unknown_status_uses_error_refund() {
        let f = fixture().await;
        let svc = service(&f, Arc::new(ScriptedProvider::new(vec![snapshot("???")])));

        let receipt = svc
            .verify_email(f.user_id, f.contact_id, &keep_on_negative())
            .await
            .unwrap();

        assert_eq!(receipt.status_code, "UNKNOWN");
        assert_eq!(receipt.credits_refunded, 1);
        let contact = f.contacts.get(f.user_id, f.contact_id).await.unwrap();
        assert!(!contact.email_verified);
    }

    #[tokio::test]
    async fn test_insufficient_funds_never_starts_job() {
        let f = fixture().await;
        f.ledger.debit(f.user_id, 10, "drain").await.unwrap();
        let provider = Arc::new(ScriptedProvider::new(vec![snapshot("FOUND")]));
        let svc = service(&f, provider.clone());

        let err = svc
            .verify_email(f.user_id, f.contact_id, &keep_on_negative())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            VerificationError::InsufficientFunds {
                available: 0,
                required: 1
            }
        );
        assert_eq!(provider.start_count(), 0);
    }

    #[tokio::test]
    async fn test_foreign_contact_rejected_before_debit() {
        let f = fixture().await;
        let svc = service(&f, Arc::new(ScriptedProvider::new(vec![snapshot("FOUND")])));

        let err = svc
            .verify_email(f.user_id + 99, f.contact_id, &keep_on_negative())
            .await
            .unwrap_err();

        assert_eq!(err, VerificationError::NotFound(f.contact_id));
        assert_eq!(f.ledger.balance(f.user_id).await.unwrap(), 10);
    }

    /// Rewrites the contact's email while the job is being polled
    struct EditedMidPoll {
        contacts: ContactService,
        user_id: UserId,
        contact_id: ContactId,
    }

    #[async_trait::async_trait]
    impl VerificationProvider for EditedMidPoll {
        fn name(&self) -> &'static str {
            "edited-mid-poll"
        }

        async fn start_job(&self, _request: &VerificationRequest) -> Result<ExternalJobId, ProviderError> {
            Ok(ExternalJobId("job-1".into()))
        }

        async fn get_status(&self, _job_id: &ExternalJobId) -> Result<JobSnapshot, ProviderError> {
            self.contacts
                .update(
                    self.user_id,
                    self.contact_id,
                    ContactPatch {
                        email: Some("ada@newco.com".into()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
            snapshot("FOUND")
        }
    }

    #[tokio::test]
    async fn test_verdict_not_applied_to_replaced_email() {
        let f = fixture().await;
        let svc = VerificationService::new(
            f.ledger.clone(),
            f.contacts.clone(),
            Arc::new(EditedMidPoll {
                contacts: f.contacts.clone(),
                user_id: f.user_id,
                contact_id: f.contact_id,
            }),
            1,
            2,
            PollBudget {
                max_attempts: 3,
                interval: Duration::from_millis(1),
            },
        );

        let receipt = svc
            .verify_email(f.user_id, f.contact_id, &keep_on_negative())
            .await
            .unwrap();

        assert!(receipt.is_valid);
        let contact = f.contacts.get(f.user_id, f.contact_id).await.unwrap();
        assert_eq!(contact.email.as_deref(), Some("ada@newco.com"));
        assert!(!contact.email_verified);
    }
}
