//! Repository for the `webhook_destinations` table.

use sqlx::PgPool;

use relay_core::kind::Kind;
use relay_core::types::DbId;

use crate::models::destination::WebhookDestination;

/// Column list for `webhook_destinations` queries.
const COLUMNS: &str = "\
    id, kind, url, headers, timeout_secs, is_enabled, created_by, \
    last_used_at, created_at, updated_at";

/// Provides configuration lookups and CRUD for webhook destinations.
pub struct DestinationRepo;

impl DestinationRepo {
    /// Resolve the enabled destination for a workflow kind.
    ///
    /// The partial unique index guarantees at most one enabled row per
    /// kind, so this is a plain `fetch_optional`.
    pub async fn resolve(
        pool: &PgPool,
        kind: Kind,
    ) -> Result<Option<WebhookDestination>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM webhook_destinations WHERE kind = $1 AND is_enabled");
        sqlx::query_as::<_, WebhookDestination>(&query)
            .bind(kind.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Bump `last_used_at` after a dispatch resolved this destination.
    pub async fn touch_last_used(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE webhook_destinations SET last_used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Create a new destination.
    pub async fn create(
        pool: &PgPool,
        kind: Kind,
        url: &str,
        headers: &serde_json::Value,
        timeout_secs: i32,
        is_enabled: bool,
        created_by: DbId,
    ) -> Result<WebhookDestination, sqlx::Error> {
        let query = format!(
            "INSERT INTO webhook_destinations \
                 (kind, url, headers, timeout_secs, is_enabled, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WebhookDestination>(&query)
            .bind(kind.as_str())
            .bind(url)
            .bind(headers)
            .bind(timeout_secs)
            .bind(is_enabled)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// List all destinations ordered by creation date (newest first).
    pub async fn list(pool: &PgPool) -> Result<Vec<WebhookDestination>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM webhook_destinations ORDER BY created_at DESC");
        sqlx::query_as::<_, WebhookDestination>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find a destination by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WebhookDestination>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM webhook_destinations WHERE id = $1");
        sqlx::query_as::<_, WebhookDestination>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a destination's settings.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        url: Option<&str>,
        headers: Option<&serde_json::Value>,
        timeout_secs: Option<i32>,
        is_enabled: Option<bool>,
    ) -> Result<Option<WebhookDestination>, sqlx::Error> {
        let query = format!(
            "UPDATE webhook_destinations SET \
                 url = COALESCE($2, url), \
                 headers = COALESCE($3, headers), \
                 timeout_secs = COALESCE($4, timeout_secs), \
                 is_enabled = COALESCE($5, is_enabled), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WebhookDestination>(&query)
            .bind(id)
            .bind(url)
            .bind(headers)
            .bind(timeout_secs)
            .bind(is_enabled)
            .fetch_optional(pool)
            .await
    }

    /// Delete a destination by ID.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM webhook_destinations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
