//! Icypeas HTTP client
//!
//! Jobs are created with `email-verification` / `email-search` and read back
//! through `bulk-single-searchs/read`.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::provider::{ExternalJobId, JobSnapshot, VerificationProvider, VerificationRequest};
use crate::config::VerificationConfig;
use crate::error::ProviderError;

#[derive(Debug, Deserialize)]
struct StartResponse {
    success: bool,
    item: Option<StartItem>,
    #[serde(default)]
    validation_errors: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct StartItem {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct ReadResponse {
    success: bool,
    #[serde(default)]
    items: Vec<ReadItem>,
}

#[derive(Debug, Deserialize)]
struct ReadItem {
    status: String,
    #[serde(default)]
    results: serde_json::Value,
}

pub struct IcypeasClient {
    client: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
}

impl IcypeasClient {
    pub fn new(config: &VerificationConfig) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| ProviderError::Rejected(format!("invalid api key header: {}", e)))?;
        headers.insert(AUTHORIZATION, key);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_ms: config.request_timeout_ms,
        })
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_err(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(path, status, &text));
        }
        response.json::<T>().await.map_err(|e| self.map_err(e))
    }

    fn map_err(&self, e: reqwest::Error) -> ProviderError {
        match ProviderError::from(e) {
            ProviderError::Timeout(_) => ProviderError::Timeout(self.timeout_ms),
            other => other,
        }
    }
}

/// Non-2xx answers. Server errors, timeouts and rate limiting are worth
/// another attempt; anything else is the vendor refusing the request.
fn classify_status(path: &str, status: StatusCode, body: &str) -> ProviderError {
    if status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
    {
        ProviderError::Transport(format!("{} returned {}", path, status))
    } else {
        ProviderError::Rejected(format!("{} returned {}: {}", path, status, body))
    }
}

/// A read with no item yet means the job has not been indexed: still pending.
fn snapshot_from_read(
    job_id: &ExternalJobId,
    response: ReadResponse,
) -> Result<JobSnapshot, ProviderError> {
    if !response.success {
        return Err(ProviderError::Rejected(format!("read failed for job {}", job_id)));
    }
    Ok(match response.items.into_iter().next() {
        Some(item) => JobSnapshot {
            status: item.status,
            payload: json!({ "results": item.results }),
        },
        None => {
            debug!(job_id = %job_id, "Icypeas job not readable yet");
            JobSnapshot {
                status: "NONE".to_string(),
                payload: serde_json::Value::Null,
            }
        }
    })
}

#[async_trait]
impl VerificationProvider for IcypeasClient {
    fn name(&self) -> &'static str {
        "icypeas"
    }

    async fn start_job(&self, request: &VerificationRequest) -> Result<ExternalJobId, ProviderError> {
        let (path, body) = match request {
            VerificationRequest::VerifyEmail { email } => {
                ("email-verification", json!({ "email": email }))
            }
            VerificationRequest::FindEmail {
                first_name,
                last_name,
                domain_or_company,
            } => (
                "email-search",
                json!({
                    "firstname": first_name,
                    "lastname": last_name,
                    "domainOrCompany": domain_or_company,
                }),
            ),
        };

        let response: StartResponse = self.post(path, body).await?;
        match response.item {
            Some(item) if response.success => {
                debug!(job_id = %item.id, kind = request.kind(), "Icypeas job created");
                Ok(ExternalJobId(item.id))
            }
            _ => Err(ProviderError::Rejected(format!(
                "job not created: {}",
                response.validation_errors
            ))),
        }
    }

    async fn get_status(&self, job_id: &ExternalJobId) -> Result<JobSnapshot, ProviderError> {
        let response: ReadResponse = self
            .post("bulk-single-searchs/read", json!({ "id": job_id.0 }))
            .await?;
        snapshot_from_read(job_id, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::verification::JobStatus;

    fn job() -> ExternalJobId {
        ExternalJobId("job-1".into())
    }

    #[test]
    fn test_read_response_decodes() {
        let raw = r#"{"success":true,"items":[{"status":"DEBITED","results":{"emails":[{"email":"ada@acme.com","certainty":"ultra_sure"}]}}]}"#;
        let parsed: ReadResponse = serde_json::from_str(raw).unwrap();
        let snap = snapshot_from_read(&job(), parsed).unwrap();
        assert_eq!(snap.email().as_deref(), Some("ada@acme.com"));
    }

    #[test]
    fn test_empty_read_is_pending() {
        let parsed: ReadResponse = serde_json::from_str(r#"{"success":true,"items":[]}"#).unwrap();
        let snap = snapshot_from_read(&job(), parsed).unwrap();
        assert_eq!(JobStatus::from_vendor(&snap.status), JobStatus::Pending);
    }

    #[test]
    fn test_failed_read_rejected() {
        let parsed: ReadResponse = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(matches!(
            snapshot_from_read(&job(), parsed),
            Err(ProviderError::Rejected(_))
        ));
    }

    #[test]
    fn test_retryable_http_statuses() {
        for status in [
            StatusCode::REQUEST_TIMEOUT,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let err = classify_status("read", status, "");
            assert!(err.is_transient(), "{} should be retried", status);
        }
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
            StatusCode::PAYMENT_REQUIRED,
        ] {
            let err = classify_status("read", status, "nope");
            assert!(matches!(err, ProviderError::Rejected(_)), "{} should be final", status);
        }
    }

    #[test]
    fn test_client_builds_from_config() {
        let config = VerificationConfig {
            api_key: "key".into(),
            base_url: "https://example.test/api/".into(),
            ..Default::default()
        };
        let client = IcypeasClient::new(&config).unwrap();
        assert_eq!(client.base_url, "https://example.test/api");
    }
}
