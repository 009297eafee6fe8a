//! Handlers for the `/jobs` resource.
//!
//! All endpoints require authentication via [`AuthUser`].
//! Admin users can read any job; regular users see only their own.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;

use relay_core::error::CoreError;
use relay_core::roles::ROLE_ADMIN;
use relay_core::types::DbId;
use relay_db::models::job::{Job, JobListQuery};
use relay_db::repositories::JobRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Fetch a job by ID and verify the caller owns it (or is admin).
///
/// Returns `NotFound` if the job does not exist, `Forbidden` if the
/// caller is not the owner and is not an admin.
async fn find_and_authorize(
    pool: &sqlx::PgPool,
    job_id: DbId,
    auth: &AuthUser,
) -> AppResult<Job> {
    let job = JobRepo::find_by_id(pool, job_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job_id,
        }))?;

    if job.submitted_by != auth.user_id && auth.role != ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Forbidden(
            "Cannot view another user's job".into(),
        )));
    }

    Ok(job)
}

/// GET /api/v1/jobs/{id}
///
/// Job status read: the poller's single data source. Returns the full
/// row (status, result, error, completion timestamp).
pub async fn get_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let job = find_and_authorize(&state.pool, job_id, &auth).await?;
    Ok(Json(DataResponse { data: job }))
}

/// GET /api/v1/jobs
///
/// List jobs. Admin users see all jobs; regular users see only their
/// own. Supports `status_id`, `kind`, `limit`, and `offset` query
/// parameters.
pub async fn list_jobs(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<JobListQuery>,
) -> AppResult<impl IntoResponse> {
    let jobs = if auth.role == ROLE_ADMIN {
        JobRepo::list_all(&state.pool, &params).await?
    } else {
        JobRepo::list_by_user(&state.pool, auth.user_id, &params).await?
    };

    Ok(Json(DataResponse { data: jobs }))
}
