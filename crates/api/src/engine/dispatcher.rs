//! Webhook dispatcher: translates an internal dispatch request into an
//! authenticated outbound call to the configured external workflow
//! endpoint, with job bookkeeping.
//!
//! No automatic retry exists at this layer. A timeout leaves the job in
//! `processing` -- the external system may still deliver a late
//! callback, and the callback receiver's idempotent terminal check is
//! the only safeguard for that race.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use relay_core::content::extract_content;
use relay_core::error::CoreError;
use relay_core::kind::Kind;
use relay_core::status::JobStatus;
use relay_core::types::DbId;
use relay_db::models::job::DispatchRequest;
use relay_db::repositories::JobRepo;

use super::resolver::{DestinationResolver, ResolvedDestination};

/// Connect timeout for the shared outbound HTTP client. The per-call
/// total timeout comes from the resolved destination.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a successful dispatch.
#[derive(Debug)]
pub struct DispatchOutcome {
    /// The tracked job, when the kind creates one.
    pub job_id: Option<DbId>,
    /// Upstream HTTP status.
    pub status: u16,
    /// Content string extracted from the upstream response.
    pub content: String,
    /// The upstream response body, untouched.
    pub raw: serde_json::Value,
}

/// A failed dispatch, carrying the job (if one was created) so the
/// caller can still surface it.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct DispatchError {
    pub job_id: Option<DbId>,
    pub source: CoreError,
}

/// Sends dispatch requests to externally configured workflow endpoints.
pub struct WebhookDispatcher {
    client: reqwest::Client,
    resolver: Arc<dyn DestinationResolver>,
}

impl WebhookDispatcher {
    /// Create a dispatcher with a pre-configured HTTP client.
    pub fn new(resolver: Arc<dyn DestinationResolver>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, resolver }
    }

    /// Dispatch a request to the external workflow for its kind.
    ///
    /// For tracked kinds, creates the job when the caller did not supply
    /// one and advances it to `processing` before the outbound call.
    /// Synchronous kinds have their job completed immediately after a
    /// successful response; asynchronous kinds are finalized later by
    /// the callback receiver.
    pub async fn dispatch(
        &self,
        pool: &PgPool,
        user_id: DbId,
        request: &DispatchRequest,
    ) -> Result<DispatchOutcome, DispatchError> {
        let kind = request.kind;

        let job_id = self
            .prepare_job(pool, user_id, request)
            .await
            .map_err(|source| DispatchError {
                job_id: None,
                source,
            })?;

        let fail = |source: CoreError| DispatchError { job_id, source };

        let destination = self
            .resolver
            .resolve(kind)
            .await
            .map_err(&fail)?
            .ok_or_else(|| fail(CoreError::Configuration(kind.as_str().to_string())))?;

        self.resolver.mark_used(destination.id).await.map_err(&fail)?;

        let (status, raw) = self
            .call_destination(&destination, kind, job_id, request)
            .await
            .map_err(&fail)?;

        let content = extract_content(&raw);

        // Synchronous kinds carry the final result in the response body.
        if kind.is_synchronous() {
            if let Some(id) = job_id {
                let finalized = JobRepo::complete(pool, id, &raw)
                    .await
                    .map_err(|e| fail(CoreError::Internal(format!("job update failed: {e}"))))?;
                if !finalized {
                    // A callback beat us to it; the stored result wins.
                    tracing::warn!(job_id = id, "Job already terminal after dispatch");
                }
            }
        }

        tracing::info!(
            kind = %kind,
            job_id,
            user_id,
            "Dispatch succeeded",
        );

        Ok(DispatchOutcome {
            job_id,
            status,
            content,
            raw,
        })
    }

    /// Job bookkeeping before the outbound call.
    ///
    /// Untracked kinds return `None`. A supplied job id must reference
    /// an existing job owned by the caller; it is advanced to
    /// `processing` only from `pending`, keeping transitions monotonic.
    async fn prepare_job(
        &self,
        pool: &PgPool,
        user_id: DbId,
        request: &DispatchRequest,
    ) -> Result<Option<DbId>, CoreError> {
        if !request.kind.creates_job() {
            return Ok(None);
        }

        let job_id = match request.job_id {
            Some(id) => {
                let job = JobRepo::find_by_id(pool, id)
                    .await
                    .map_err(|e| CoreError::Internal(format!("job lookup failed: {e}")))?
                    .ok_or(CoreError::NotFound {
                        entity: "Job",
                        id,
                    })?;
                if job.submitted_by != user_id {
                    return Err(CoreError::Forbidden(
                        "Cannot dispatch another user's job".into(),
                    ));
                }
                if JobStatus::from_id(job.status_id).is_some_and(JobStatus::is_terminal) {
                    return Err(CoreError::Conflict(
                        "Job is already in a terminal state".into(),
                    ));
                }
                id
            }
            None => {
                let job = JobRepo::create(
                    pool,
                    user_id,
                    request.kind,
                    request.conversation_id,
                    &request.payload,
                )
                .await
                .map_err(|e| CoreError::Internal(format!("job creation failed: {e}")))?;

                tracing::info!(
                    job_id = job.id,
                    kind = %request.kind,
                    user_id,
                    "Job created for dispatch",
                );
                job.id
            }
        };

        JobRepo::mark_processing(pool, job_id)
            .await
            .map_err(|e| CoreError::Internal(format!("job update failed: {e}")))?;

        Ok(Some(job_id))
    }

    /// Execute the outbound POST with the destination's headers and hard
    /// timeout, and classify the response.
    async fn call_destination(
        &self,
        destination: &ResolvedDestination,
        kind: Kind,
        job_id: Option<DbId>,
        request: &DispatchRequest,
    ) -> Result<(u16, serde_json::Value), CoreError> {
        // Envelope so the peer can correlate its callback; the payload
        // itself passes through verbatim.
        let body = serde_json::json!({
            "job_id": job_id,
            "kind": kind,
            "conversation_id": request.conversation_id,
            "payload": request.payload,
        });

        let mut outbound = self
            .client
            .post(&destination.url)
            .timeout(destination.timeout)
            .json(&body);

        if let serde_json::Value::Object(headers) = &destination.headers {
            for (name, value) in headers {
                if let serde_json::Value::String(value) = value {
                    outbound = outbound.header(name, value);
                } else {
                    tracing::warn!(header = %name, "Skipping non-string destination header");
                }
            }
        }

        let response = outbound.send().await.map_err(|e| {
            if e.is_timeout() {
                CoreError::Timeout(format!(
                    "No response from destination within {}s",
                    destination.timeout.as_secs()
                ))
            } else {
                CoreError::Upstream {
                    status: 0,
                    body: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());

        if !status.is_success() {
            return Err(CoreError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        // Upstream bodies are not reliably JSON; a non-JSON body is
        // treated as a bare string response.
        let raw = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
        Ok((status.as_u16(), raw))
    }
}
