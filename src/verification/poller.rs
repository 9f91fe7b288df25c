//! Bounded status polling

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::provider::{ExternalJobId, VerificationProvider};
use super::status::ResolvedResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Resolved(ResolvedResult),
    /// Budget spent while the job was still pending. Not an error.
    Exhausted { attempts: u32 },
}

/// Polls a vendor job until it reaches a terminal status or the attempt
/// budget runs out.
///
/// - Pending: sleep `interval`, query again
/// - Success / NegativeResult / PermanentError / Unknown: return at once
/// - Transport error: counts as an attempt, then retried
/// - Any other provider error: terminal `PROVIDER_ERROR`
///
/// The attempt budget is the only cancellation mechanism.
#[derive(Clone)]
pub struct VerificationPoller {
    provider: Arc<dyn VerificationProvider>,
}

impl VerificationPoller {
    pub fn new(provider: Arc<dyn VerificationProvider>) -> Self {
        Self { provider }
    }

    pub async fn poll_until_resolved(
        &self,
        job_id: &ExternalJobId,
        max_attempts: u32,
        interval: Duration,
    ) -> PollOutcome {
        for attempt in 1..=max_attempts {
            match self.provider.get_status(job_id).await {
                Ok(snapshot) => {
                    if let Some(result) = ResolvedResult::from_vendor(&snapshot.status, snapshot.email())
                    {
                        info!(
                            job_id = %job_id,
                            attempt,
                            status = %result.status_code,
                            "Verification job resolved"
                        );
                        return PollOutcome::Resolved(result);
                    }
                    debug!(job_id = %job_id, attempt, status = %snapshot.status, "Job pending");
                }
                Err(e) if e.is_transient() => {
                    warn!(job_id = %job_id, attempt, error = %e, "Status query failed, will retry");
                }
                Err(e) => {
                    warn!(job_id = %job_id, attempt, error = %e, "Status query rejected");
                    return PollOutcome::Resolved(ResolvedResult::provider_error(e.to_string()));
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(interval).await;
            }
        }

        warn!(job_id = %job_id, attempts = max_attempts, "Verification poll budget exhausted");
        PollOutcome::Exhausted {
            attempts: max_attempts,
        }
    }
}
