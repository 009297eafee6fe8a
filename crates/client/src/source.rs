//! Job status source port and its HTTP implementation.
//!
//! The poller reads job state through [`JobStatusSource`] so tests can
//! substitute a scripted fake for the HTTP round trip.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use relay_core::status::StatusId;
use relay_core::types::{DbId, Timestamp};

/// HTTP request timeout for a single status check.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The slice of a job row the poller cares about.
///
/// Additional fields returned by the status endpoint are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct JobSnapshot {
    pub id: DbId,
    pub status_id: StatusId,
    pub result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub completed_at: Option<Timestamp>,
}

/// Error type for status check failures.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The status endpoint returned a non-2xx status code.
    #[error("Status endpoint returned HTTP {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Capability: fetch the current snapshot of a job.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn fetch(&self, job_id: DbId) -> Result<JobSnapshot, SourceError>;
}

/// `{ "data": ... }` envelope returned by the status endpoint.
#[derive(Debug, Deserialize)]
struct DataEnvelope {
    data: JobSnapshot,
}

/// Production source reading `GET /api/v1/jobs/{id}` with a Bearer token.
pub struct HttpStatusSource {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpStatusSource {
    /// Create a source for the given API base URL (no trailing slash)
    /// and access token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl JobStatusSource for HttpStatusSource {
    async fn fetch(&self, job_id: DbId) -> Result<JobSnapshot, SourceError> {
        let response = self
            .client
            .get(format!("{}/api/v1/jobs/{}", self.base_url, job_id))
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SourceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let envelope = response.json::<DataEnvelope>().await?;
        Ok(envelope.data)
    }
}
