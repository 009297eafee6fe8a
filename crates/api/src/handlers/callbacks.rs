//! Handler for the callback ingress.
//!
//! The external workflow system pushes a completed result (or an error)
//! for a job it was dispatched. Delivery is idempotent: once a job is
//! terminal, further callbacks are acknowledged but ignored, so a
//! duplicate can never overwrite the stored result.

use axum::extract::State;
use axum::Json;

use relay_core::error::CoreError;
use relay_core::status::JobStatus;
use relay_db::models::job::{CallbackRequest, Job};
use relay_db::repositories::JobRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::callback::CallbackAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/callbacks
///
/// Finalize a job with a result or an error. Requires the callback
/// shared secret; end-user sessions are not accepted here.
pub async fn receive_callback(
    _auth: CallbackAuth,
    State(state): State<AppState>,
    Json(input): Json<CallbackRequest>,
) -> AppResult<Json<DataResponse<Job>>> {
    if input.result.is_some() == input.error.is_some() {
        return Err(AppError::BadRequest(
            "Exactly one of 'result' or 'error' must be present".into(),
        ));
    }

    let job = JobRepo::find_by_id(&state.pool, input.job_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: input.job_id,
        }))?;

    if JobStatus::from_id(job.status_id).is_some_and(JobStatus::is_terminal) {
        tracing::info!(job_id = job.id, "Duplicate callback ignored (job terminal)");
        return Ok(Json(DataResponse { data: job }));
    }

    let applied = match (&input.result, &input.error) {
        (Some(result), None) => JobRepo::complete(&state.pool, job.id, result).await?,
        (None, Some(error)) => JobRepo::fail(&state.pool, job.id, error).await?,
        _ => unreachable!("validated above"),
    };

    if !applied {
        // Lost the race with another finalizer between read and write;
        // the first terminal write wins.
        tracing::info!(job_id = job.id, "Callback lost finalization race");
    } else {
        tracing::info!(
            job_id = job.id,
            completed = input.result.is_some(),
            "Job finalized by callback",
        );
    }

    let finalized = JobRepo::find_by_id(&state.pool, job.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job.id,
        }))?;

    Ok(Json(DataResponse { data: finalized }))
}
