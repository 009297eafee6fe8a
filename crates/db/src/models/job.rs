//! Job entity model and DTOs for the workflow coordination subsystem.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use relay_core::kind::Kind;
use relay_core::status::StatusId;
use relay_core::types::{DbId, Timestamp};

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    pub kind: String,
    pub status_id: StatusId,
    pub submitted_by: DbId,
    pub conversation_id: Option<Uuid>,
    pub payload: serde_json::Value,
    pub result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// DTO for `POST /api/v1/dispatch`.
#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    pub kind: Kind,
    /// Opaque blob forwarded to the external workflow verbatim.
    pub payload: serde_json::Value,
    /// Existing job to attach this dispatch to. When absent, tracked
    /// kinds get a job row created on their behalf.
    pub job_id: Option<DbId>,
    /// Groups related jobs (e.g. one chat session).
    pub conversation_id: Option<Uuid>,
}

/// DTO for `POST /api/v1/callbacks`.
///
/// Exactly one of `result` / `error` must be present.
#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    pub job_id: DbId,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

/// Query parameters for `GET /api/v1/jobs`.
#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    /// Filter by status ID (e.g. 2 = processing, 4 = failed).
    pub status_id: Option<StatusId>,
    /// Filter by workflow kind.
    pub kind: Option<Kind>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
