//! Vendor status vocabulary, decided once at the boundary

use serde::Serialize;
use utoipa::ToSchema;

/// Closed job status. Nothing past the provider boundary inspects raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Success,
    NegativeResult,
    PermanentError,
    /// Unrecognized vendor status; terminal, never retried
    Unknown,
}

impl JobStatus {
    pub fn from_vendor(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "NONE" | "SCHEDULED" | "IN_PROGRESS" => JobStatus::Pending,
            "FOUND" | "DEBITED" => JobStatus::Success,
            "NOT_FOUND" | "DEBITED_NOT_FOUND" => JobStatus::NegativeResult,
            "BAD_INPUT" | "INSUFFICIENT_FUNDS" | "ABORTED" => JobStatus::PermanentError,
            _ => JobStatus::Unknown,
        }
    }
}

/// Terminal answer of a verification/finder job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ResolvedResult {
    pub status: JobStatus,
    pub is_valid: bool,
    /// Vendor status string, or `UNKNOWN`
    pub status_code: String,
    pub message: String,
    /// Address reported by the vendor (finder jobs)
    pub email: Option<String>,
}

impl ResolvedResult {
    /// Build from a terminal vendor status. `None` for `Pending`.
    pub fn from_vendor(raw_status: &str, email: Option<String>) -> Option<Self> {
        let status = JobStatus::from_vendor(raw_status);
        let (is_valid, status_code, message) = match status {
            JobStatus::Pending => return None,
            JobStatus::Success => (true, raw_status.to_string(), "Email found and deliverable"),
            JobStatus::NegativeResult => (false, raw_status.to_string(), "No deliverable email found"),
            JobStatus::PermanentError => {
                (false, raw_status.to_string(), "Provider could not process the request")
            }
            JobStatus::Unknown => (false, "UNKNOWN".to_string(), "Unrecognized provider status"),
        };
        Some(Self {
            status,
            is_valid,
            status_code,
            message: message.to_string(),
            email: if is_valid { email } else { None },
        })
    }

    /// Terminal result for a provider error that retrying cannot fix
    pub fn provider_error(message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::PermanentError,
            is_valid: false,
            status_code: "PROVIDER_ERROR".to_string(),
            message: message.into(),
            email: None,
        }
    }
}
