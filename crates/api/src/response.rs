//! Shared response envelope types for API handlers.
//!
//! Plain resource endpoints use the `{ "data": ... }` envelope. The
//! dispatch endpoint uses [`DispatchResponse`]: dispatcher-level failures
//! are returned as a structured `success: false` body instead of an HTTP
//! error status, so the caller always gets the same shape back.

use serde::Serialize;
use serde_json::Value;

use relay_core::types::DbId;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Normalized payload of a successful dispatch.
#[derive(Debug, Serialize)]
pub struct DispatchData {
    /// Content string extracted from the upstream response.
    pub content: String,
    /// Rendering hint for the caller. Always `"markdown"`.
    pub format: &'static str,
    /// The upstream response body, untouched.
    pub raw: Value,
}

/// Envelope returned by `POST /api/v1/dispatch`.
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub success: bool,
    /// Upstream HTTP status, or 0 when no upstream response was received
    /// (missing configuration, timeout).
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<DispatchData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchResponse {
    pub fn ok(status: u16, job_id: Option<DbId>, content: String, raw: Value) -> Self {
        Self {
            success: true,
            status,
            job_id,
            data: Some(DispatchData {
                content,
                format: "markdown",
                raw,
            }),
            error: None,
        }
    }

    pub fn failure(status: u16, job_id: Option<DbId>, error: String) -> Self {
        Self {
            success: false,
            status,
            job_id,
            data: None,
            error: Some(error),
        }
    }
}
