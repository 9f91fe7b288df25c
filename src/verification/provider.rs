//! Verification vendor seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ProviderError;

/// Vendor-assigned job id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalJobId(pub String);

impl fmt::Display for ExternalJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationRequest {
    VerifyEmail {
        email: String,
    },
    FindEmail {
        first_name: String,
        last_name: String,
        domain_or_company: String,
    },
}

impl VerificationRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            VerificationRequest::VerifyEmail { .. } => "verify_email",
            VerificationRequest::FindEmail { .. } => "find_email",
        }
    }
}

/// Raw job state as reported by the vendor
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot {
    pub status: String,
    pub payload: serde_json::Value,
}

impl JobSnapshot {
    /// First email in the vendor's result list, if any
    pub fn email(&self) -> Option<String> {
        self.payload
            .pointer("/results/emails/0/email")
            .and_then(|v| v.as_str())
            .map(String::from)
    }
}

/// Asynchronous vendor job API
#[async_trait]
pub trait VerificationProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Submit a job. An error here means no job exists.
    async fn start_job(&self, request: &VerificationRequest) -> Result<ExternalJobId, ProviderError>;

    async fn get_status(&self, job_id: &ExternalJobId) -> Result<JobSnapshot, ProviderError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_email_extraction() {
        let snap = JobSnapshot {
            status: "FOUND".into(),
            payload: serde_json::json!({ "results": { "emails": [{ "email": "a@b.io" }, { "email": "c@d.io" }] } }),
        };
        assert_eq!(snap.email().as_deref(), Some("a@b.io"));

        let empty = JobSnapshot {
            status: "NOT_FOUND".into(),
            payload: serde_json::json!({}),
        };
        assert_eq!(empty.email(), None);
    }
}
