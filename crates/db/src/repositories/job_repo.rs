//! Repository for the `jobs` table.
//!
//! Status transitions are monotonic: `pending → processing →
//! {completed|failed}`. Every finalizing update carries a
//! `status_id NOT IN (terminal)` guard, so a duplicate or late write is
//! a no-op (`rows_affected = 0`) rather than an overwrite. Jobs are
//! never deleted here; a job whose callback never arrives stays in
//! `processing` (the poller surfaces it as a timeout).

use sqlx::PgPool;
use uuid::Uuid;

use relay_core::kind::Kind;
use relay_core::status::{JobStatus, TERMINAL_STATUSES};
use relay_core::types::DbId;

use crate::models::job::{Job, JobListQuery};

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, kind, status_id, submitted_by, conversation_id, \
    payload, result, error_message, \
    created_at, updated_at, completed_at";

/// Maximum page size for job listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for job listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations for workflow jobs.
pub struct JobRepo;

impl JobRepo {
    /// Create a new job in `pending` status.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        kind: Kind,
        conversation_id: Option<Uuid>,
        payload: &serde_json::Value,
    ) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (kind, status_id, submitted_by, conversation_id, payload) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(kind.as_str())
            .bind(JobStatus::Pending.id())
            .bind(user_id)
            .bind(conversation_id)
            .bind(payload)
            .fetch_one(pool)
            .await
    }

    /// Advance a job from `pending` to `processing`.
    ///
    /// Returns `true` if the transition happened, `false` if the job was
    /// not in `pending` (already processing or terminal).
    pub async fn mark_processing(pool: &PgPool, job_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs \
             SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id = $3",
        )
        .bind(job_id)
        .bind(JobStatus::Processing.id())
        .bind(JobStatus::Pending.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a job as completed with its result payload.
    ///
    /// Returns `false` (no-op) if the job is already terminal, so a
    /// duplicate callback never overwrites the stored result.
    pub async fn complete(
        pool: &PgPool,
        job_id: DbId,
        result: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let outcome = sqlx::query(
            "UPDATE jobs \
             SET status_id = $2, result = $3, error_message = NULL, \
                 completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id NOT IN ($4, $5)",
        )
        .bind(job_id)
        .bind(JobStatus::Completed.id())
        .bind(result)
        .bind(TERMINAL_STATUSES[0])
        .bind(TERMINAL_STATUSES[1])
        .execute(pool)
        .await?;
        Ok(outcome.rows_affected() > 0)
    }

    /// Mark a job as failed with a human-readable error message.
    ///
    /// Same idempotent-terminal guard as [`JobRepo::complete`]. No
    /// automatic retry exists anywhere; a failed job stays failed until
    /// the caller dispatches a fresh one.
    pub async fn fail(pool: &PgPool, job_id: DbId, error: &str) -> Result<bool, sqlx::Error> {
        let outcome = sqlx::query(
            "UPDATE jobs \
             SET status_id = $2, error_message = $3, \
                 completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id NOT IN ($4, $5)",
        )
        .bind(job_id)
        .bind(JobStatus::Failed.id())
        .bind(error)
        .bind(TERMINAL_STATUSES[0])
        .bind(TERMINAL_STATUSES[1])
        .execute(pool)
        .await?;
        Ok(outcome.rows_affected() > 0)
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List jobs for a specific user with optional filters and pagination.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        params: &JobListQuery,
    ) -> Result<Vec<Job>, sqlx::Error> {
        Self::list_jobs(pool, Some(user_id), params).await
    }

    /// List all jobs (admin view) with optional filters and pagination.
    pub async fn list_all(pool: &PgPool, params: &JobListQuery) -> Result<Vec<Job>, sqlx::Error> {
        Self::list_jobs(pool, None, params).await
    }

    /// Shared listing query builder. When `user_id` is `Some`, filters to
    /// that user's jobs; when `None`, returns all jobs (admin view).
    async fn list_jobs(
        pool: &PgPool,
        user_id: Option<DbId>,
        params: &JobListQuery,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        // Build the WHERE clause and track the next bind parameter index.
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if user_id.is_some() {
            conditions.push(format!("submitted_by = ${bind_idx}"));
            bind_idx += 1;
        }

        if params.status_id.is_some() {
            conditions.push(format!("status_id = ${bind_idx}"));
            bind_idx += 1;
        }

        if params.kind.is_some() {
            conditions.push(format!("kind = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             {where_clause} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Job>(&query);

        if let Some(uid) = user_id {
            q = q.bind(uid);
        }
        if let Some(sid) = params.status_id {
            q = q.bind(sid);
        }
        if let Some(kind) = params.kind {
            q = q.bind(kind.as_str());
        }

        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }
}
