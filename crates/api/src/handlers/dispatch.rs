//! Handler for the dispatch ingress.
//!
//! Dispatcher-level failures (missing configuration, upstream errors,
//! timeouts) are returned as a structured `success: false` envelope --
//! never as an HTTP error status -- so the calling UI can surface them
//! as a transient notification and decide whether to re-initiate.
//! There is no automatic retry.

use axum::extract::State;
use axum::Json;

use relay_core::error::CoreError;
use relay_db::models::job::DispatchRequest;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DispatchResponse;
use crate::state::AppState;

/// POST /api/v1/dispatch
///
/// Forward a payload to the external workflow configured for its kind.
pub async fn dispatch(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<DispatchRequest>,
) -> AppResult<Json<DispatchResponse>> {
    match state
        .dispatcher
        .dispatch(&state.pool, auth.user_id, &input)
        .await
    {
        Ok(outcome) => Ok(Json(DispatchResponse::ok(
            outcome.status,
            outcome.job_id,
            outcome.content,
            outcome.raw,
        ))),
        Err(failure) => {
            let job_id = failure.job_id;
            match failure.source {
                CoreError::Configuration(kind) => {
                    tracing::warn!(kind = %kind, user_id = auth.user_id, "No destination for kind");
                    Ok(Json(DispatchResponse::failure(
                        0,
                        job_id,
                        format!("No enabled destination configured for kind '{kind}'"),
                    )))
                }
                CoreError::Timeout(msg) => {
                    tracing::warn!(job_id, user_id = auth.user_id, "Dispatch timed out");
                    Ok(Json(DispatchResponse::failure(0, job_id, msg)))
                }
                CoreError::Upstream { status, body } => {
                    tracing::warn!(
                        job_id,
                        status,
                        user_id = auth.user_id,
                        "Upstream rejected dispatch",
                    );
                    Ok(Json(DispatchResponse::failure(
                        status,
                        job_id,
                        format!("Upstream returned HTTP {status}: {body}"),
                    )))
                }
                // Caller mistakes (unknown/foreign/terminal job) and
                // internal failures keep the standard error mapping.
                other => Err(AppError::Core(other)),
            }
        }
    }
}
