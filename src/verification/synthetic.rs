//! Offline vendor stand-in for development builds

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::json;
use ulid::Ulid;

use super::provider::{ExternalJobId, JobSnapshot, VerificationProvider, VerificationRequest};
use crate::contacts::CompanyName;
use crate::contacts::validation::guess_domain;
use crate::error::ProviderError;

/// Resolves every job on the first status query, after which the job is
/// forgotten.
///
/// Verification accepts any syntactically plausible address; the finder
/// answers `first.last@<domain>`.
#[derive(Default)]
pub struct SyntheticVerificationProvider {
    jobs: DashMap<String, VerificationRequest>,
}

impl SyntheticVerificationProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

fn plausible(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    }
}

fn domain_for(domain_or_company: &str) -> Option<String> {
    let raw = domain_or_company.trim();
    if raw.contains('.') && !raw.contains(' ') {
        return Some(raw.to_lowercase());
    }
    CompanyName::parse(raw).as_ref().and_then(guess_domain)
}

#[async_trait]
impl VerificationProvider for SyntheticVerificationProvider {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn start_job(&self, request: &VerificationRequest) -> Result<ExternalJobId, ProviderError> {
        let id = format!("syn-{}", Ulid::new());
        self.jobs.insert(id.clone(), request.clone());
        Ok(ExternalJobId(id))
    }

    async fn get_status(&self, job_id: &ExternalJobId) -> Result<JobSnapshot, ProviderError> {
        // Every answer below is terminal, so the job can go.
        let (_, request) = self
            .jobs
            .remove(&job_id.0)
            .ok_or_else(|| ProviderError::Rejected(format!("unknown job {}", job_id)))?;

        let email = match request {
            VerificationRequest::VerifyEmail { email } => plausible(&email).then_some(email),
            VerificationRequest::FindEmail {
                first_name,
                last_name,
                domain_or_company,
            } => {
                let local = [first_name, last_name]
                    .iter()
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(".");
                domain_for(&domain_or_company)
                    .filter(|_| !local.is_empty())
                    .map(|d| format!("{}@{}", local, d))
            }
        };

        Ok(match email {
            Some(email) => JobSnapshot {
                status: "FOUND".to_string(),
                payload: json!({ "results": { "emails": [{ "email": email }] } }),
            },
            None => JobSnapshot {
                status: "NOT_FOUND".to_string(),
                payload: json!({ "results": {} }),
            },
        })
    }
}
